//! Persistence for the single session token.
//!
//! Writes and deletes surface [`OAuthError::Persistence`]. Reads never fail:
//! an unreadable slot is logged and reported as empty.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use octoview_types::SessionToken;
use parking_lot::RwLock;

use crate::error::{OAuthError, Result};

pub use octoview_types::is_token_expired;

// ============================================================================
// TokenStore Trait
// ============================================================================

/// A single durable slot holding the session token.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Persist `token`, replacing whatever was stored.
    async fn save_token(&self, token: &SessionToken) -> Result<()>;

    /// Authoritative read.
    async fn get_token(&self) -> Option<SessionToken>;

    /// Best-effort read usable outside an async context.
    fn get_token_sync(&self) -> Option<SessionToken>;

    /// Delete the stored token. An empty slot is not an error.
    async fn remove_token(&self) -> Result<()>;
}

/// Shared token store for use across async contexts.
pub type SharedTokenStore = Arc<dyn TokenStore>;

// ============================================================================
// FileTokenStore
// ============================================================================

/// JSON file readable only by the current user.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Option<SessionToken> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to parse token file");
                None
            }
        }
    }

    fn write(&self, token: &SessionToken) -> std::io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let json = serde_json::to_vec_pretty(token)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        restrict_permissions(tmp.as_file())?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save_token(&self, token: &SessionToken) -> Result<()> {
        let store = self.clone();
        let token = token.clone();
        blocking(move || store.write(&token)).await?.map_err(|e| {
            tracing::error!(error = %e, "Failed to save token");
            OAuthError::Persistence(format!("Failed to write token file: {}", e))
        })?;
        tracing::info!("Token saved to {}", self.path.display());
        Ok(())
    }

    async fn get_token(&self) -> Option<SessionToken> {
        let store = self.clone();
        match blocking(move || store.read()).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read token file");
                None
            }
        }
    }

    fn get_token_sync(&self) -> Option<SessionToken> {
        self.read()
    }

    async fn remove_token(&self) -> Result<()> {
        let path = self.path.clone();
        match blocking(move || std::fs::remove_file(path)).await? {
            Ok(()) => {
                tracing::info!("Token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OAuthError::Persistence(format!(
                "Failed to delete token file: {}",
                e
            ))),
        }
    }
}

/// Run synchronous storage work on the blocking pool.
async fn blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| OAuthError::Persistence(format!("Token storage task failed: {e}")))
}

// ============================================================================
// KeyringTokenStore
// ============================================================================

/// OS credential store (macOS Keychain, Linux secret-service, Windows Credential Manager).
#[cfg(feature = "keyring")]
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    user: String,
}

#[cfg(feature = "keyring")]
impl KeyringTokenStore {
    /// Keyring service name.
    pub const SERVICE_NAME: &'static str = "octoview";

    /// Keyring user name of the token slot.
    pub const USER_NAME: &'static str = "github_token";

    pub fn new() -> Self {
        Self {
            service: Self::SERVICE_NAME.to_string(),
            user: Self::USER_NAME.to_string(),
        }
    }

    fn entry(&self) -> std::result::Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(&self.service, &self.user)
    }

    fn read(&self) -> Option<SessionToken> {
        let secret = match self.entry().and_then(|e| e.get_password()) {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get token from keyring");
                return None;
            }
        };
        match serde_json::from_str(&secret) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse token from keyring");
                None
            }
        }
    }
}

#[cfg(feature = "keyring")]
impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "keyring")]
#[async_trait]
impl TokenStore for KeyringTokenStore {
    async fn save_token(&self, token: &SessionToken) -> Result<()> {
        let json = serde_json::to_string(token)
            .map_err(|e| OAuthError::Serialization(format!("Failed to serialize token: {}", e)))?;
        let store = self.clone();
        blocking(move || store.entry().and_then(|e| e.set_password(&json)))
            .await?
            .map_err(|e| OAuthError::Persistence(format!("Failed to store in keyring: {}", e)))?;
        tracing::info!("Token saved to system keyring");
        Ok(())
    }

    async fn get_token(&self) -> Option<SessionToken> {
        let store = self.clone();
        match blocking(move || store.read()).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get token from keyring");
                None
            }
        }
    }

    fn get_token_sync(&self) -> Option<SessionToken> {
        self.read()
    }

    async fn remove_token(&self) -> Result<()> {
        let store = self.clone();
        match blocking(move || store.entry().and_then(|e| e.delete_credential())).await? {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(OAuthError::Persistence(format!(
                "Failed to delete from keyring: {}",
                e
            ))),
        }
    }
}

// ============================================================================
// InMemoryTokenStore (for testing)
// ============================================================================

/// In-memory token store for testing.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<SessionToken>>,
    fail_writes: AtomicBool,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save/remove fail with a persistence error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(OAuthError::Persistence(
                "simulated storage failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn save_token(&self, token: &SessionToken) -> Result<()> {
        self.check_writable()?;
        *self.token.write() = Some(token.clone());
        Ok(())
    }

    async fn get_token(&self) -> Option<SessionToken> {
        self.token.read().clone()
    }

    fn get_token_sync(&self) -> Option<SessionToken> {
        self.token.read().clone()
    }

    async fn remove_token(&self) -> Result<()> {
        self.check_writable()?;
        *self.token.write() = None;
        Ok(())
    }
}
