//! Response cache facade over a [`CacheBackend`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use crate::backend::{CacheBackend, FileBackend, MemoryBackend};
use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::error::Result;

/// Hash a logical key into the identifier used by the backend.
///
/// The mapping is deterministic and one-way, so stored keys cannot be
/// enumerated by name.
pub fn storage_id(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// TTL-aware key/value cache for API responses.
///
/// Cloning is cheap and clones share the same backend.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
}

impl ResponseCache {
    /// Create a cache over an arbitrary backend.
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    /// Cache stored as one file per entry under `dir`.
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(dir)), CacheConfig::default())
    }

    /// Cache held in process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), CacheConfig::default())
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Stored payload for `key`, or `None` when absent or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with_metadata(key).await.map(|entry| entry.data)
    }

    /// Stored entry (payload and write time) for `key`.
    pub async fn get_with_metadata<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        match self.read_entry(key).await {
            Ok(Some(entry)) => {
                trace!(key, "cache hit");
                Some(entry)
            }
            Ok(None) => {
                trace!(key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Error retrieving from cache");
                None
            }
        }
    }

    /// Overwrite the entry for `key` with `data` stamped with the current time.
    pub async fn set<T: Serialize>(&self, key: &str, data: &T) {
        match self.write_entry(key, data).await {
            Ok(()) => debug!(key, "cache updated"),
            Err(e) => warn!(key, error = %e, "Error setting cache"),
        }
    }

    /// True if there is no readable entry for `key` or it is older than `ttl`.
    pub async fn is_expired(&self, key: &str, ttl: Duration) -> bool {
        match self
            .get_with_metadata::<serde::de::IgnoredAny>(key)
            .await
        {
            Some(entry) => entry.is_older_than(ttl),
            None => true,
        }
    }

    /// [`is_expired`](Self::is_expired) with the configured default TTL.
    pub async fn is_expired_default(&self, key: &str) -> bool {
        self.is_expired(key, self.config.default_ttl).await
    }

    /// Remove the entry for `key`, if any.
    pub async fn invalidate(&self, key: &str) {
        let id = storage_id(key);
        match self.blocking(move |backend| backend.remove(&id)).await {
            Ok(()) => debug!(key, "cache entry invalidated"),
            Err(e) => warn!(key, error = %e, "Error invalidating cache"),
        }
    }

    /// Remove every entry.
    pub async fn invalidate_all(&self) {
        match self.blocking(|backend| backend.clear()).await {
            Ok(()) => debug!("cache cleared"),
            Err(e) => warn!(error = %e, "Error invalidating all cache"),
        }
    }

    async fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CacheEntry<T>>> {
        let id = storage_id(key);
        let Some(bytes) = self.blocking(move |backend| backend.read(&id)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write_entry<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let bytes = serde_json::to_vec(&CacheEntry::new(data))?;
        let id = storage_id(key);
        self.blocking(move |backend| backend.write(&id, &bytes)).await
    }

    /// Run a backend call on the blocking pool; backends do synchronous I/O.
    async fn blocking<R, F>(&self, op: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&dyn CacheBackend) -> Result<R> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || op(backend.as_ref())).await?
    }
}
