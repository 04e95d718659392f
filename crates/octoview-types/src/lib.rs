//! Shared types for octoview.
//!
//! - [`token`]: the session token persisted across restarts
//! - [`github`]: raw response shapes from the GitHub REST API
//! - [`domain`]: the shapes the rest of the app works with, plus the
//!   conversions from the raw API shapes

pub mod domain;
pub mod github;
pub mod token;

pub use domain::{Repository, User, repositories_from};
pub use github::{AuthenticatedUser, RawRepository};
pub use token::{SessionToken, is_token_expired};
