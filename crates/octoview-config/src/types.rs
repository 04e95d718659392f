//! Configuration types.
//!
//! ```toml
//! [github]
//! client_id = "Iv1.0123456789abcdef"
//! api_base_url = "https://api.github.com"
//! redirect_uri = "http://127.0.0.1:8976/callback"
//! scopes = ["user", "repo"]
//!
//! [cache]
//! ttl_secs = 300
//!
//! [http]
//! timeout_secs = 30
//!
//! [storage]
//! token_backend = "keyring"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::xdg_config_dir;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default base URL for the OAuth authorize/token endpoints.
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com";

/// Default redirect URI registered for the OAuth app.
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8976/callback";

/// Default OAuth scopes.
pub const DEFAULT_SCOPES: &[&str] = &["user", "repo"];

/// Default response cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the cache subdirectory.
const CACHE_DIR_NAME: &str = "app-cache";

/// Default token file name within the config directory.
const TOKEN_FILE: &str = "github-token.json";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OctoviewConfig {
    /// GitHub OAuth app and endpoints.
    pub github: Option<GithubConfig>,

    /// Response cache settings.
    pub cache: Option<CacheConfig>,

    /// HTTP client settings.
    pub http: Option<HttpConfig>,

    /// Token persistence settings.
    pub storage: Option<StorageConfig>,
}

/// `[github]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// OAuth client id. `GITHUB_CLIENT_ID` takes precedence.
    pub client_id: Option<String>,

    /// OAuth client secret. `GITHUB_CLIENT_SECRET` takes precedence.
    /// Storing it here is supported but produces a warning.
    pub client_secret: Option<String>,

    /// REST API base URL.
    pub api_base_url: Option<String>,

    /// Base URL for `/login/oauth/authorize` and `/login/oauth/access_token`.
    pub oauth_base_url: Option<String>,

    /// Redirect URI registered with the OAuth app.
    pub redirect_uri: Option<String>,

    /// Requested scopes.
    pub scopes: Option<Vec<String>>,
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory. Default: `<platform cache dir>/octoview/app-cache`.
    pub dir: Option<PathBuf>,

    /// Freshness window for cached responses.
    pub ttl_secs: Option<u64>,
}

/// `[http]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout_secs: Option<u64>,
}

/// Where the session token is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// JSON file with owner-only permissions.
    #[default]
    File,
    /// OS credential store.
    Keyring,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub token_backend: Option<TokenBackend>,

    /// Token file path for the `file` backend.
    pub token_path: Option<PathBuf>,
}

impl OctoviewConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections merge field by field, so a project file can override a
    /// single value without repeating the rest of the user config.
    pub fn merge(&mut self, other: OctoviewConfig) {
        if let Some(gh) = other.github {
            let base = self.github.get_or_insert_with(Default::default);
            overlay(&mut base.client_id, gh.client_id);
            overlay(&mut base.client_secret, gh.client_secret);
            overlay(&mut base.api_base_url, gh.api_base_url);
            overlay(&mut base.oauth_base_url, gh.oauth_base_url);
            overlay(&mut base.redirect_uri, gh.redirect_uri);
            overlay(&mut base.scopes, gh.scopes);
        }

        if let Some(cache) = other.cache {
            let base = self.cache.get_or_insert_with(Default::default);
            overlay(&mut base.dir, cache.dir);
            overlay(&mut base.ttl_secs, cache.ttl_secs);
        }

        if let Some(http) = other.http {
            let base = self.http.get_or_insert_with(Default::default);
            overlay(&mut base.timeout_secs, http.timeout_secs);
        }

        if let Some(storage) = other.storage {
            let base = self.storage.get_or_insert_with(Default::default);
            overlay(&mut base.token_backend, storage.token_backend);
            overlay(&mut base.token_path, storage.token_path);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Effective values
    // ─────────────────────────────────────────────────────────────────────────

    pub fn api_base_url(&self) -> String {
        self.github
            .as_ref()
            .and_then(|g| g.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn oauth_base_url(&self) -> String {
        self.github
            .as_ref()
            .and_then(|g| g.oauth_base_url.clone())
            .unwrap_or_else(|| DEFAULT_OAUTH_BASE_URL.to_string())
    }

    pub fn redirect_uri(&self) -> String {
        self.github
            .as_ref()
            .and_then(|g| g.redirect_uri.clone())
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
    }

    pub fn scopes(&self) -> Vec<String> {
        self.github
            .as_ref()
            .and_then(|g| g.scopes.clone())
            .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.cache
                .as_ref()
                .and_then(|c| c.ttl_secs)
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http
                .as_ref()
                .and_then(|h| h.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn token_backend(&self) -> TokenBackend {
        self.storage
            .as_ref()
            .and_then(|s| s.token_backend)
            .unwrap_or_default()
    }

    /// Cache directory: configured value, else `<platform cache dir>/octoview/app-cache`.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = self.cache.as_ref().and_then(|c| c.dir.clone()) {
            return Some(dir);
        }
        dirs::cache_dir().map(|d| d.join(crate::discovery::APP_NAME).join(CACHE_DIR_NAME))
    }

    /// Token file: configured value, else `<config dir>/github-token.json`.
    pub fn token_path(&self) -> Option<PathBuf> {
        if let Some(path) = self.configured_token_path() {
            return Some(path);
        }
        xdg_config_dir().map(|d| d.join(TOKEN_FILE))
    }

    /// Like [`token_path`](Self::token_path) with an explicit config directory.
    pub fn token_path_in(&self, config_dir: &Path) -> PathBuf {
        self.configured_token_path()
            .unwrap_or_else(|| config_dir.join(TOKEN_FILE))
    }

    fn configured_token_path(&self) -> Option<PathBuf> {
        self.storage.as_ref().and_then(|s| s.token_path.clone())
    }

    /// True when a client secret is written in the config file itself.
    pub fn has_plaintext_secret(&self) -> bool {
        self.github
            .as_ref()
            .and_then(|g| g.client_secret.as_deref())
            .is_some_and(|s| !s.is_empty())
    }
}

fn overlay<T>(base: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *base = value;
    }
}
