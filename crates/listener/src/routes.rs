//! Router and request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use nodes::PipelineOrchestrator;
use pipeline::{error_chain, PipelineInput, PipelineResult, ValidationError};
use tracing::{error, info, warn};

use crate::ApiError;

/// Route of the pipeline trigger.
pub const PIPELINE_ROUTE: &str = "/api/aiPipeline";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
}

/// Builds the trigger router.
pub fn router(orchestrator: Arc<PipelineOrchestrator>) -> Router {
    Router::new()
        .route(PIPELINE_ROUTE, post(run_pipeline))
        .route("/healthz", get(healthz))
        .with_state(AppState { orchestrator })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn run_pipeline(
    State(state): State<AppState>,
    body: Result<Json<PipelineInput>, JsonRejection>,
) -> Result<Json<PipelineResult>, ApiError> {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected unreadable request body");
            return Err(ValidationError {
                missing: vec!["title", "specPrompt"],
            }
            .into());
        }
    };

    let request = input.validate().inspect_err(|e| {
        warn!(missing = ?e.missing, "Rejected pipeline request");
    })?;

    info!(title = %request.title(), "pipeline started");
    let result = state.orchestrator.run(&request).await.inspect_err(|e| {
        error!(stage = ?e.stage(), error = %error_chain(e), "pipeline failed");
    })?;
    info!(
        title = %result.title,
        task_record_id = %result.task_record_id,
        "pipeline completed"
    );

    Ok(Json(result))
}
