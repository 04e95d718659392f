//! Error types for cache backends.
//!
//! These never escape [`ResponseCache`](crate::ResponseCache); they exist so
//! backends can use `?` and the cache can log what went wrong.

/// Error type for cache backend operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blocking task running a backend call panicked or was cancelled.
    #[error("Cache task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for cache backend operations.
pub type Result<T> = std::result::Result<T, Error>;
