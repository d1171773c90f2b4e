//! SpecFlow pipeline orchestration.
//!
//! This crate drives one pipeline run through its four stages
//! (Specify → Design → Research → File) by sequencing calls to the ports
//! defined in the [`pipeline`] crate.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The orchestrator sequences calls between business
//! logic in the [`pipeline`] crate and infrastructure traits (generation
//! clients, record backend). It contains no domain rules of its own and knows
//! nothing about any provider's wire format.

pub mod orchestrator;
pub mod state;

pub use orchestrator::PipelineOrchestrator;
pub use state::PipelineState;
