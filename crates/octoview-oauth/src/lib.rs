//! GitHub OAuth 2.0 PKCE login and session token storage.
//!
//! # Components
//!
//! - [`oauth`]: PKCE challenge, state, authorization URL, code-for-token exchange
//! - [`exchange`]: the login state machine driving an external [`AuthorizationPrompt`]
//! - [`token_store`]: persistence of the single [`SessionToken`](octoview_types::SessionToken)

pub mod error;
pub mod exchange;
pub mod oauth;
pub mod token_store;

pub use error::{OAuthError, Result};
pub use exchange::{
    AuthExchange, AuthResponse, AuthState, AuthorizationOutcome, AuthorizationPrompt,
    AuthorizationRequest, Authenticator,
};
pub use oauth::{OAuthConfig, PkceChallenge};
pub use token_store::{
    FileTokenStore, InMemoryTokenStore, SharedTokenStore, TokenStore, is_token_expired,
};

#[cfg(feature = "keyring")]
pub use token_store::KeyringTokenStore;
