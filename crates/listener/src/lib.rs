//! SpecFlow inbound HTTP trigger.
//!
//! Exposes the pipeline over HTTP so it can be invoked by webhook-style
//! callers:
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/api/aiPipeline` | `POST` | Validate a [`pipeline::PipelineInput`] and run the pipeline once |
//! | `/healthz` | `GET` | Liveness check |
//!
//! ## Response mapping
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Missing `title` / `specPrompt`, or unreadable JSON | 400 | `{"error": "title and specPrompt are required"}` |
//! | Pipeline completed | 200 | [`pipeline::PipelineResult`] |
//! | Pipeline failed at any stage | 500 | `{"error": "<failure message>"}` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details live here. The orchestrator is
//! received fully wired from the composition root in `cli`.

mod error;
mod routes;
mod server;

pub use error::{ApiError, ListenerError};
pub use routes::{router, AppState, PIPELINE_ROUTE};
pub use server::serve;
