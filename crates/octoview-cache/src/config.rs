//! Configuration for the response cache.

use std::time::Duration;

/// Default TTL used by [`ResponseCache::is_expired_default`](crate::ResponseCache::is_expired_default).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when the caller does not pass one.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_five_minutes() {
        assert_eq!(CacheConfig::default().default_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_with_default_ttl() {
        let config = CacheConfig::new().with_default_ttl(Duration::from_secs(10));
        assert_eq!(config.default_ttl, Duration::from_secs(10));
    }
}
