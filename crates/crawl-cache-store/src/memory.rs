//! In-process cache store

use crate::error::Result;
use crate::store::{clamp_ttl, CacheResult, CacheStore};
use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    data: Bytes,
    ttl: Duration,
    stored_at: Instant,
}

/// Expires each entry after the TTL it was written with
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Cache store that keeps entries in a moka cache
///
/// Expired entries are evicted by moka's housekeeping whether or not they
/// are read again. Never fails.
pub struct MemoryStore {
    cache: Cache<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let cache = Cache::builder().expire_after(EntryExpiry).build();
        Self { cache }
    }

    /// Time left before `key` expires, or `None` if it is absent or expired
    pub async fn expires_in(&self, key: &str) -> Option<Duration> {
        let entry = self.cache.get(key).await?;
        entry
            .ttl
            .checked_sub(entry.stored_at.elapsed())
            .filter(|left| !left.is_zero())
    }

    /// Number of entries held, after evicting the expired ones
    pub async fn len(&self) -> usize {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult {
        match self.cache.get(key).await {
            Some(entry) => CacheResult::Hit(entry.data),
            None => CacheResult::Miss,
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let entry = Entry {
            data: value,
            ttl: clamp_ttl(ttl),
            stored_at: Instant::now(),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
