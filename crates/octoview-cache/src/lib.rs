//! Response cache with TTL checks and hashed storage keys.
//!
//! Maps a logical key (`"github:user"`) to a serialized payload plus the
//! time it was written. Freshness is checked lazily by the caller through
//! [`ResponseCache::is_expired`]; nothing sweeps the store in the background.
//!
//! Read failures are indistinguishable from a miss, and write failures are
//! logged and dropped. The cache never blocks a feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use octoview_cache::ResponseCache;
//!
//! let cache = ResponseCache::on_disk("/tmp/octoview/app-cache");
//! cache.set("github:user", &user).await;
//! if !cache.is_expired("github:user", Duration::from_secs(300)).await {
//!     let user: Option<AuthenticatedUser> = cache.get("github:user").await;
//! }
//! ```

mod backend;
mod cache;
mod config;
mod entry;
mod error;

pub use backend::{CacheBackend, FileBackend, MemoryBackend};
pub use cache::{ResponseCache, storage_id};
pub use config::{CacheConfig, DEFAULT_TTL};
pub use entry::CacheEntry;
pub use error::{Error, Result};
