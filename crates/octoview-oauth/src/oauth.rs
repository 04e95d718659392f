//! OAuth 2.0 PKCE primitives for GitHub.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{OAuthError, Result};

/// Default GitHub web base URL.
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// Default timeout for the token exchange request.
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth configuration for a GitHub OAuth app.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub revocation_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl OAuthConfig {
    /// Config for github.com with the `user` and `repo` scopes.
    pub fn github(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let client_id = client_id.into();
        Self {
            authorize_url: format!("{}/login/oauth/authorize", GITHUB_BASE_URL),
            token_url: format!("{}/login/oauth/access_token", GITHUB_BASE_URL),
            revocation_url: format!(
                "{}/settings/connections/applications/{}",
                GITHUB_BASE_URL, client_id
            ),
            client_id,
            client_secret: client_secret.into(),
            redirect_uri: "http://127.0.0.1:8976/callback".to_string(),
            scopes: vec!["user".to_string(), "repo".to_string()],
            timeout: EXCHANGE_TIMEOUT,
        }
    }

    /// Point the authorize, token and revocation endpoints at another host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.authorize_url = format!("{}/login/oauth/authorize", base);
        self.token_url = format!("{}/login/oauth/access_token", base);
        self.revocation_url = format!(
            "{}/settings/connections/applications/{}",
            base, self.client_id
        );
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new S256 PKCE challenge pair.
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

        Self {
            verifier,
            challenge,
        }
    }
}

/// Generate a random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Build the authorization URL for the OAuth flow.
pub fn build_authorization_url(config: &OAuthConfig, challenge: &str, state: &str) -> String {
    let scope = config.scopes.join(" ");
    let params = [
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
        ("state", state),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url, query)
}

/// Body of the token endpoint response.
///
/// GitHub answers failed exchanges with `200 OK` and an `error` field, so
/// every field is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange an authorization code for an access token.
pub async fn exchange_code_for_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<String> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_verifier", verifier),
    ];

    let response = http
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&params)
        .timeout(config.timeout)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("Token exchange request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(OAuthError::ExchangeFailed(format!(
            "{} - {}",
            status, error_text
        )));
    }

    let body: TokenResponse = response.json().await.map_err(|e| {
        OAuthError::ExchangeFailed(format!("Failed to parse token response: {}", e))
    })?;

    match body.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            let reason = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| "response contained no access_token".to_string());
            Err(OAuthError::ExchangeFailed(format!(
                "No access token returned: {}",
                reason
            )))
        }
    }
}

/// Extract `(code, state)` from what the user's browser landed on.
///
/// Accepts the full redirect URL, a bare query string, or `code#state`.
/// An `error` parameter from the provider becomes [`OAuthError::LoginFailed`].
pub fn parse_callback(input: &str) -> Result<(String, String)> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(OAuthError::InvalidRequest("Empty callback".to_string()));
    }

    if !trimmed.contains('=') {
        return parse_code_state(trimmed);
    }

    let url = if trimmed.contains("://") {
        url::Url::parse(trimmed)
    } else {
        url::Url::parse(&format!(
            "http://localhost/?{}",
            trimmed.trim_start_matches('?')
        ))
    }
    .map_err(|e| OAuthError::InvalidRequest(format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(OAuthError::LoginFailed(error_description.unwrap_or(error)));
    }

    match (code, state) {
        (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => Ok((code, state)),
        _ => Err(OAuthError::InvalidRequest(
            "Missing code or state".to_string(),
        )),
    }
}

fn parse_code_state(input: &str) -> Result<(String, String)> {
    let Some((code, state)) = input.split_once('#') else {
        return Err(OAuthError::InvalidRequest(
            "Invalid format. Expected a redirect URL or code#state".to_string(),
        ));
    };
    if code.is_empty() || state.is_empty() {
        return Err(OAuthError::InvalidRequest(
            "Missing code or state".to_string(),
        ));
    }
    Ok((code.to_string(), state.to_string()))
}
