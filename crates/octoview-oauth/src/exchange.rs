//! Login state machine.
//!
//! The browser step is opaque: an [`AuthorizationPrompt`] receives the
//! authorization URL and reports back success, cancellation or an error.
//! [`AuthExchange`] turns a successful outcome into an access token.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{OAuthError, Result};
use crate::oauth::{
    OAuthConfig, PkceChallenge, build_authorization_url, exchange_code_for_token, generate_state,
};

/// What the prompt is asked to show the user.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Full authorization URL including PKCE challenge and state.
    pub url: String,
    /// State value the provider must echo back.
    pub state: String,
    /// Where the provider will redirect after consent.
    pub redirect_uri: String,
}

/// Result reported by the interaction surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Success { code: String, state: String },
    Cancelled,
    Error(String),
}

/// The user-facing half of the authorization step (browser, system dialog, console).
#[async_trait]
pub trait AuthorizationPrompt: Send + Sync {
    async fn authorize(&self, request: &AuthorizationRequest) -> AuthorizationOutcome;
}

/// Successful login result. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub code: String,
    pub token: String,
    pub state: String,
}

/// Anything that can log a user in and hand back an access token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self) -> Result<AuthResponse>;
}

/// Progress of the most recent login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    AuthorizationRequested,
    AuthorizationGranted,
    AuthorizationDenied,
    TokenExchanged,
    ExchangeFailed,
}

/// PKCE authorization-code login against GitHub.
pub struct AuthExchange {
    config: OAuthConfig,
    prompt: Arc<dyn AuthorizationPrompt>,
    http: reqwest::Client,
    state: Mutex<AuthState>,
}

impl std::fmt::Debug for AuthExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthExchange")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl AuthExchange {
    pub fn new(config: OAuthConfig, prompt: Arc<dyn AuthorizationPrompt>) -> Self {
        Self {
            config,
            prompt,
            http: reqwest::Client::new(),
            state: Mutex::new(AuthState::Idle),
        }
    }

    /// Current state of the last (or in-flight) login attempt.
    pub fn state(&self) -> AuthState {
        *self.state.lock()
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn transition(&self, next: AuthState) {
        let mut state = self.state.lock();
        debug!(from = ?*state, to = ?next, "auth state transition");
        *state = next;
    }
}

#[async_trait]
impl Authenticator for AuthExchange {
    async fn login(&self) -> Result<AuthResponse> {
        self.transition(AuthState::Idle);

        let pkce = PkceChallenge::generate();
        let expected_state = generate_state();
        let request = AuthorizationRequest {
            url: build_authorization_url(&self.config, &pkce.challenge, &expected_state),
            state: expected_state.clone(),
            redirect_uri: self.config.redirect_uri.clone(),
        };

        self.transition(AuthState::AuthorizationRequested);
        let outcome = self.prompt.authorize(&request).await;

        let (code, state) = match outcome {
            AuthorizationOutcome::Success { code, state } => (code, state),
            AuthorizationOutcome::Cancelled => {
                self.transition(AuthState::AuthorizationDenied);
                info!("Authorization cancelled by user");
                return Err(OAuthError::LoginCancelled);
            }
            AuthorizationOutcome::Error(reason) => {
                self.transition(AuthState::AuthorizationDenied);
                warn!(%reason, "Authorization failed");
                return Err(OAuthError::LoginFailed(reason));
            }
        };

        if state != expected_state {
            self.transition(AuthState::AuthorizationDenied);
            return Err(OAuthError::LoginFailed(
                "State mismatch, possible CSRF attempt".to_string(),
            ));
        }
        self.transition(AuthState::AuthorizationGranted);

        match exchange_code_for_token(&self.http, &self.config, &code, &pkce.verifier).await {
            Ok(token) => {
                self.transition(AuthState::TokenExchanged);
                info!("Authorization code exchanged for access token");
                Ok(AuthResponse { code, token, state })
            }
            Err(e) => {
                self.transition(AuthState::ExchangeFailed);
                Err(match e {
                    OAuthError::Network(msg) => OAuthError::ExchangeFailed(msg),
                    other => other,
                })
            }
        }
    }
}
