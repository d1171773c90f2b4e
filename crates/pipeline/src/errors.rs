//! Error taxonomy for the SpecFlow domain.
//!
//! | Error | Raised by | Classification |
//! |-------|-----------|----------------|
//! | [`ValidationError`] | request validation at the boundary | client |
//! | [`GenerationFailure`] | any generation stage | server |
//! | [`StoreFailure`] | lookup / create-source / create-task | server |
//! | [`ConfigurationError`] | startup only | fatal, never per-run |
//!
//! No error in this module is retried. A failure at any stage aborts the run
//! and reaches the caller unchanged in cause, tagged with the [`Stage`] at
//! which it occurred.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed cause carried by the stage failures.
///
/// Adapters keep their own concrete error types; the domain only needs to
/// preserve them as the `source()` of the failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Renders `error` followed by each of its causes, separated by `": "`.
///
/// Errors in this workspace never repeat their cause in their own message, so
/// this is the full, non-redundant description of a failure.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

// ---------------------------------------------------------------------------
// Stage tags
// ---------------------------------------------------------------------------

/// One step of the fixed four-step pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Draft a specification from the raw requirement.
    Specify,
    /// Derive a design from the specification.
    Design,
    /// Gather background research for the specification.
    Research,
    /// Upsert the source record and file the task record.
    File,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Specify => "specify",
            Self::Design => "design",
            Self::Research => "research",
            Self::File => "file",
        };
        f.write_str(name)
    }
}

/// The role a generation client plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationRole {
    /// Produces the specification artefact.
    Specifier,
    /// Produces the design artefact.
    Designer,
    /// Produces the research artefact. The only role allowed to degrade
    /// gracefully when unconfigured.
    Researcher,
}

impl GenerationRole {
    /// The pipeline stage this role executes.
    pub fn stage(self) -> Stage {
        match self {
            Self::Specifier => Stage::Specify,
            Self::Designer => Stage::Design,
            Self::Researcher => Stage::Research,
        }
    }
}

impl fmt::Display for GenerationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Specifier => "Specifier",
            Self::Designer => "Designer",
            Self::Researcher => "Researcher",
        };
        f.write_str(name)
    }
}

/// The record store operation that was in flight when a [`StoreFailure`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStage {
    /// Looking up an existing source record by URL.
    LookupSource,
    /// Creating a new source record.
    CreateSource,
    /// Creating the task record.
    CreateTask,
}

impl fmt::Display for StoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LookupSource => "look up source record",
            Self::CreateSource => "create source record",
            Self::CreateTask => "create task record",
        };
        f.write_str(name)
    }
}

/// How a boundary should classify an error for its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was unacceptable; the pipeline never started.
    Client,
    /// The pipeline started and failed.
    Server,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A required request field was missing or empty.
///
/// Produced before the orchestrator is invoked; the pipeline never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("title and specPrompt are required")]
pub struct ValidationError {
    /// Wire names of the fields that were missing or empty.
    pub missing: Vec<&'static str>,
}

impl ValidationError {
    /// Always [`ErrorClass::Client`].
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Client
    }
}

/// A generation stage failed.
///
/// The underlying transport or service error is preserved as [`source`].
///
/// [`source`]: std::error::Error::source
#[derive(Debug, Error)]
#[error("{role} generation failed")]
pub struct GenerationFailure {
    /// The role whose call failed.
    pub role: GenerationRole,
    /// The original failure.
    #[source]
    pub cause: BoxError,
}

impl GenerationFailure {
    /// Wraps `cause` as a failure of `role`.
    pub fn new(role: GenerationRole, cause: impl Into<BoxError>) -> Self {
        Self {
            role,
            cause: cause.into(),
        }
    }
}

/// A record store primitive failed.
///
/// No rollback is attempted: a source record created before a failing
/// create-task call stays in the store.
#[derive(Debug, Error)]
#[error("record store failed to {stage}")]
pub struct StoreFailure {
    /// The primitive that failed.
    pub stage: StoreStage,
    /// The original failure.
    #[source]
    pub cause: BoxError,
}

impl StoreFailure {
    /// Wraps `cause` as a failure of `stage`.
    pub fn new(stage: StoreStage, cause: impl Into<BoxError>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

/// A required credential or target was missing or malformed at startup.
///
/// Fatal: the process must not accept any run with an invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error: {message}")]
pub struct ConfigurationError {
    /// Description of the configuration problem.
    pub message: String,
}

impl ConfigurationError {
    /// Creates a configuration error with a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates the error for a required value that is absent.
    pub fn missing(name: &str) -> Self {
        Self::new(format!("required value '{name}' is not set"))
    }
}

/// A pipeline run failed after it started.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A generation stage failed.
    #[error(transparent)]
    Generation(#[from] GenerationFailure),

    /// The filing stage failed.
    #[error(transparent)]
    Store(#[from] StoreFailure),
}

impl PipelineError {
    /// The stage at which the run failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Generation(failure) => failure.role.stage(),
            Self::Store(_) => Stage::File,
        }
    }

    /// Always [`ErrorClass::Server`]; validation happens before a run exists.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Server
    }
}
