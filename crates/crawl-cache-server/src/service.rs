//! Cache-aside fetch and purge logic
//!
//! A fetch checks the store first and falls through to the origin on a miss,
//! writing the body back with a fixed TTL. A store that cannot be read is
//! treated as a miss; a store that cannot be written fails the request.
//! Concurrent misses for the same URL each go to the origin and the last
//! write wins.

use crate::error::{CrawlError, Result};
use crate::origin::Origin;
use crate::types::{CacheSource, FetchRequest, PurgeRequest, ServiceStats};
use bytes::Bytes;
use crawl_cache_store::{CacheResult, CacheStore};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Entry lifetime for crawled bodies
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// A body returned by [`CrawlService::fetch`]
#[derive(Debug)]
pub struct Fetched {
    pub body: Bytes,
    pub source: CacheSource,
}

/// Fetch orchestrator over an injected store and origin
pub struct CrawlService {
    store: Arc<dyn CacheStore>,
    origin: Arc<dyn Origin>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    store_errors: AtomicU64,
}

#[instrument(name = "parse_json", skip_all, fields(size = body.len()))]
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

impl CrawlService {
    pub fn new(store: Arc<dyn CacheStore>, origin: Arc<dyn Origin>, ttl: Duration) -> Self {
        Self {
            store,
            origin,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
        }
    }

    /// Handle a raw `/fetch` body
    pub async fn fetch(&self, body: &[u8]) -> Result<Fetched> {
        let request: FetchRequest = decode(body)?;
        self.fetch_url(&request.url).await
    }

    /// Handle a raw `/purge` body
    pub async fn purge(&self, body: &[u8]) -> Result<()> {
        let request: PurgeRequest = decode(body)?;
        self.purge_url(&request.url).await
    }

    /// Return the body for `url`, from cache when possible
    #[instrument(name = "fetch", skip(self))]
    pub async fn fetch_url(&self, url: &str) -> Result<Fetched> {
        match self.store.get(url).await {
            CacheResult::Hit(body) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(size = body.len(), "Cache hit");
                return Ok(Fetched {
                    body,
                    source: CacheSource::Hit,
                });
            }
            CacheResult::Miss => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss");
            }
            CacheResult::Error(e) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Cache lookup failed, fetching from origin");
            }
        }

        let body = self.origin.get(url).await?;

        self.store
            .set(url, body.clone(), self.ttl)
            .await
            .map_err(CrawlError::CacheWrite)?;

        Ok(Fetched {
            body,
            source: CacheSource::Miss,
        })
    }

    /// Drop any cached body for `url`
    #[instrument(name = "purge", skip(self))]
    pub async fn purge_url(&self, url: &str) -> Result<()> {
        self.store.delete(url).await.map_err(CrawlError::Store)?;
        debug!("Purged");
        Ok(())
    }

    /// Whether the store answers a ping
    pub async fn store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Cache store ping failed");
                false
            }
        }
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}
