//! Domain error types.

use octoview_oauth::OAuthError;
use thiserror::Error;

/// Domain-level errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Login, token exchange or token persistence failed.
    #[error("Auth error: {0}")]
    Auth(#[from] OAuthError),

    /// GitHub API access failed.
    #[error("API error: {0}")]
    Api(#[from] octoview_client::Error),
}

impl DomainError {
    /// No credential was available, or GitHub rejected it.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, DomainError::Api(e) if e.is_auth_error())
    }

    /// The user backed out of the authorization step.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Auth(OAuthError::LoginCancelled))
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
