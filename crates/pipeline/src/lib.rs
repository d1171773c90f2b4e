//! Core domain for SpecFlow.
//!
//! SpecFlow turns a free-text requirement into a persisted task record: a
//! specification is drafted, a design is derived from it, background research
//! is gathered, and the three artefacts are filed into a record store with
//! optional deduplication against a source record.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used throughout the system, plus the one piece of real
//! business logic that lives below the orchestrator: the record store's
//! upsert-and-relate algorithm. Infrastructure crates implement the traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TaskRecordId`, `SourceUrl`, `PipelineRunId`, etc.) |
//! | [`types`] | Request, artefact, record, and result value types |
//! | [`errors`] | Error taxonomy and stage tags |
//! | [`generation`] | The [`GenerationClient`] port |
//! | [`store`] | The [`RecordBackend`] port and the [`RecordStore`] upsert-and-relate logic |
//! | `testing` | In-memory doubles (feature `test-support`) |

pub mod errors;
pub mod generation;
pub mod identifiers;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    error_chain, BoxError, ConfigurationError, ErrorClass, GenerationFailure, GenerationRole, PipelineError,
    Stage, StoreFailure, StoreStage, ValidationError,
};
pub use generation::{GenerationClient, GenerationContext};
pub use identifiers::{
    CollectionId, EmptyIdentifier, PipelineRunId, SourceRecordId, SourceUrl, TaskRecordId,
};
pub use store::{RecordBackend, RecordStore, FALLBACK_SOURCE_TITLE};
pub use types::{
    Artifacts, GeneratedArtifact, NewTaskRecord, PipelineInput, PipelineRequest, PipelineResult,
    SourceRecord, SourceReference, TaskBody, TaskRecord, TaskStatus,
};
