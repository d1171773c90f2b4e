//! Listener errors and their HTTP rendering.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use pipeline::{error_chain, ErrorClass, PipelineError, ValidationError};
use serde_json::json;
use thiserror::Error;

/// Failure to start or keep running the HTTP server.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server stopped unexpectedly: {0}")]
    Serve(#[source] std::io::Error),
}

/// A request that ended in an error response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(e) => e.class(),
            Self::Pipeline(e) => e.class(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.class() {
            ErrorClass::Client => StatusCode::BAD_REQUEST,
            ErrorClass::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": error_chain(&self) }))).into_response()
    }
}
