//! Notion adapter errors.

use thiserror::Error;

/// Failure of a single Notion API call.
#[derive(Debug, Error)]
pub enum NotionError {
    /// The request never produced a response.
    #[error("Notion request failed")]
    Transport(#[from] reqwest::Error),

    /// Notion answered with a non-success status.
    #[error("Notion API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim. Notion returns a JSON object with `code`
        /// and `message` fields.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("invalid Notion response: {0}")]
    Decode(reqwest::Error),

    /// A created page came back without an id.
    #[error("Notion returned a page without an id")]
    MissingId,
}
