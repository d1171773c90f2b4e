//! Provider-level errors.

use thiserror::Error;

/// Failure of a single call to a generation service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim, for diagnosis.
        body: String,
    },

    /// The response body was not the JSON shape the provider documents.
    #[error("invalid response: {0}")]
    Decode(reqwest::Error),
}

impl ProviderError {
    /// HTTP status of an [`Api`](Self::Api) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
