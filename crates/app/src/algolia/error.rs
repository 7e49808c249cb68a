//! Error types for the Algolia search client.

use thiserror::Error;

/// Errors that can occur when querying Algolia.
#[derive(Debug, Error)]
pub enum AlgoliaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Algolia returned an error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The application id or key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse the response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Application id, search key or index name is missing.
    #[error("Algolia is not configured")]
    NotConfigured,

    /// A credential cannot be sent as a header value.
    #[error("Algolia credentials contain characters that are not valid in a header")]
    InvalidCredentials,
}

/// Error body returned by Algolia.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}
