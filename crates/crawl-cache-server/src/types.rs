//! Request and response types for the crawl cache service

use serde::{Deserialize, Serialize};

/// Body of `POST /fetch`
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// Accepted for compatibility, not used
    #[serde(default)]
    pub key: Option<String>,
}

/// Body of `POST /purge`
#[derive(Debug, Clone, Deserialize)]
pub struct PurgeRequest {
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
}

/// Where a fetched body was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Hit,
    Miss,
}

impl CacheSource {
    /// Value for the `X-Cache` response header
    pub fn as_header(&self) -> &'static str {
        match self {
            CacheSource::Hit => "HIT",
            CacheSource::Miss => "MISS",
        }
    }
}

/// Counters kept by the fetch service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    pub hits: u64,
    pub misses: u64,
    pub store_errors: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub store: String,
    pub stats: ServiceStats,
}
