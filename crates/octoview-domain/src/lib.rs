//! Session orchestration for octoview.
//!
//! [`SessionService`] is the single place that knows whether a user is
//! logged in. It owns the session token, mirrors it into the token store and
//! the API client, and forces a logout when a token has outlived its
//! lifetime.
//!
//! - **Login**: runs the OAuth exchange and stamps a seven hour session
//! - **Data access**: profile and repository list, mapped to domain shapes
//! - **Events**: [`SessionEvent`] broadcast to any number of subscribers
//!
//! # Example
//!
//! ```ignore
//! use octoview_domain::SessionService;
//!
//! let session = SessionService::new(auth, api, store);
//! session.login().await?;
//!
//! if let Some(user) = session.get_user_profile(false).await? {
//!     println!("{} follows {}", user.name, user.number_of_following);
//! }
//! ```

mod error;
mod events;
pub mod services;

pub use error::{DomainError, Result};
pub use events::SessionEvent;
pub use services::session::{LogoutCallback, SESSION_LIFETIME, SessionService};

// Re-export key types from infrastructure crates for convenience
pub use octoview_client::GithubApi;
pub use octoview_oauth::{Authenticator, SharedTokenStore, TokenStore};
pub use octoview_types::{Repository, SessionToken, User};
