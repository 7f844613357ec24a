//! The cache store contract

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Logical table holding crawled URL bodies
pub const CRAWLED_NAMESPACE: &str = "crawled";

/// Longest lifetime any entry is given; longer TTLs are clamped to this
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// TTL actually applied for a requested `ttl`
pub fn clamp_ttl(ttl: Duration) -> Duration {
    ttl.min(MAX_ENTRY_TTL)
}

/// Physical key for a URL inside the crawled namespace
pub fn namespaced_key(url: &str) -> String {
    format!("{}:{}", CRAWLED_NAMESPACE, url)
}

/// Outcome of a cache lookup
///
/// Store failures are kept apart from absence so callers can decide for
/// themselves whether an unreachable store counts as a miss.
#[derive(Debug)]
pub enum CacheResult {
    Hit(Bytes),
    Miss,
    Error(StoreError),
}

impl CacheResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheResult::Hit(_))
    }
}

/// Key-value store with per-entry expiry
///
/// Keys are URLs. Implementations acquire whatever connection they need per
/// call and release it before returning.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the payload stored under `key`
    async fn get(&self, key: &str) -> CacheResult;

    /// Store `value` under `key`, replacing any previous value, expiring `ttl` from now
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key() {
        assert_eq!(
            namespaced_key("https://example.com/a?b=c"),
            "crawled:https://example.com/a?b=c"
        );
    }

    #[test]
    fn test_clamp_ttl() {
        let three_hours = Duration::from_secs(3 * 60 * 60);
        assert_eq!(clamp_ttl(three_hours), three_hours);
        assert_eq!(clamp_ttl(Duration::from_secs(u64::MAX)), MAX_ENTRY_TTL);
        assert_eq!(clamp_ttl(Duration::MAX), MAX_ENTRY_TTL);
    }

    #[test]
    fn test_cache_result_is_hit() {
        assert!(CacheResult::Hit(Bytes::from_static(b"x")).is_hit());
        assert!(!CacheResult::Miss.is_hit());
        assert!(!CacheResult::Error(StoreError::Pool("down".to_string())).is_hit());
    }
}
