//! Stored cache entry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A cached payload and the time it was written.
///
/// `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Wrap `data` with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: now_millis(),
        }
    }

    /// Milliseconds elapsed since the entry was written. Negative if the
    /// clock moved backwards.
    pub fn age_millis(&self) -> i64 {
        now_millis() - self.timestamp
    }

    /// True when the entry is older than `ttl`.
    pub fn is_older_than(&self, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_millis() > ttl_ms
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
