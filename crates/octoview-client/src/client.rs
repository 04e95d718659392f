//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use octoview_cache::{DEFAULT_TTL, ResponseCache};
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{ReposApi, UserApi};
use crate::error::{Error, Result};

/// Default GitHub REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client.
///
/// Every call requires a bearer credential set via
/// [`GithubApi::set_bearer_token`](crate::GithubApi::set_bearer_token).
/// Successful responses are written to the [`ResponseCache`] and served from
/// it until they are older than the cache TTL.
///
/// # Example
///
/// ```no_run
/// use octoview_client::GithubClient;
///
/// # async fn example() -> octoview_client::Result<()> {
/// let client = GithubClient::builder()
///     .bearer_token("gho_example")
///     .build()?;
///
/// let user = client.user().authenticated(false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GithubClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Current access token, if any.
    pub(crate) bearer: RwLock<Option<String>>,
    /// Response cache.
    pub(crate) cache: ResponseCache,
    /// Maximum age of a cache entry that is still served.
    pub(crate) cache_ttl: Duration,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("has_token", &self.inner.bearer.read().is_some())
            .field("cache_ttl", &self.inner.cache_ttl)
            .finish()
    }
}

impl GithubClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Maximum age of a cache entry that is still served.
    pub fn cache_ttl(&self) -> Duration {
        self.inner.cache_ttl
    }

    /// Replace (or clear) the access token used for subsequent requests.
    pub fn set_token(&self, token: Option<String>) {
        *self.inner.bearer.write() = token;
    }

    /// Whether a bearer credential is currently set.
    pub fn has_token(&self) -> bool {
        self.inner.bearer.read().is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the user API.
    pub fn user(&self) -> UserApi {
        UserApi::new(self.clone())
    }

    /// Access the repositories API.
    pub fn repos(&self) -> ReposApi {
        ReposApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Current token, or [`Error::Unauthenticated`].
    pub(crate) fn require_token(&self) -> Result<String> {
        self.inner.bearer.read().clone().ok_or(Error::Unauthenticated)
    }

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Make an authenticated GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        let url = self.url(path)?;
        let auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| Error::Config("Invalid access token".to_string()))?;

        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .header(AUTHORIZATION, auth)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Cached value for `key` if present and younger than the TTL.
    pub(crate) async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = &self.inner.cache;
        if cache.is_expired(key, self.inner.cache_ttl).await {
            return None;
        }
        let value = cache.get(key).await;
        if value.is_some() {
            tracing::debug!(key, "Serving from cache");
        }
        value
    }

    /// Write a fresh response to the cache. Failures are logged, not returned.
    pub(crate) async fn store<T: Serialize>(&self, key: &str, value: &T) {
        self.inner.cache.set(key, value).await;
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "GitHub API request failed");
            Err(Error::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Builder for creating a GithubClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    bearer_token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    cache: Option<ResponseCache>,
    cache_ttl: Duration,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            cache: None,
            cache_ttl: DEFAULT_TTL,
        }
    }

    /// Set the API base URL. Defaults to `https://api.github.com`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the initial access token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the response cache. Defaults to an in-memory cache.
    pub fn cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the maximum age of a cache entry that is still served.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GithubClient> {
        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        // Parse and normalize base URL
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("octoview/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(GithubClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                bearer: RwLock::new(self.bearer_token),
                cache: self.cache.unwrap_or_else(ResponseCache::in_memory),
                cache_ttl: self.cache_ttl,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_github() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.github.com/");
        assert_eq!(client.cache_ttl(), Duration::from_secs(300));
        assert!(!client.has_token());
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/api")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = ClientBuilder::new().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        let url = client.url("user/repos").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/user/repos");

        let url = client.url("/user").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/user");
    }

    #[test]
    fn test_token_shared_across_clones() {
        let client = ClientBuilder::new().build().unwrap();
        let clone = client.clone();

        client.set_token(Some("gho_1".to_string()));
        assert_eq!(clone.require_token().unwrap(), "gho_1");

        clone.set_token(None);
        assert!(matches!(
            client.require_token(),
            Err(Error::Unauthenticated)
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = ClientBuilder::new().bearer_token("gho_secret").build().unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("gho_secret"));
        assert!(debug.contains("has_token: true"));
    }
}
