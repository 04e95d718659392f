//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No bearer credential is set.
    #[error("No authentication token available")]
    Unauthenticated,

    /// GitHub returned a non-success status.
    #[error("GitHub API error ({status}): {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// No credential set, or GitHub rejected the one we sent.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthenticated) || matches!(self, Error::Upstream { status: 401, .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
