//! Error types for login and token storage.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur during login or token persistence.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The user dismissed the authorization step.
    #[error("Login cancelled")]
    LoginCancelled,

    /// The authorization step did not report success.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// The code-for-token exchange did not yield an access token.
    #[error("Token exchange failed: {0}")]
    ExchangeFailed(String),

    /// Secure storage write or delete failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid request or callback input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}
