//! Service configuration from environment variables

use crate::error::{ServerError, ServerResult};
use crate::service::DEFAULT_CACHE_TTL;
use crawl_cache_store::RedisStoreConfig;
use std::str::FromStr;
use std::time::Duration;

/// Which store backs the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = ServerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(ServerError::Config(format!(
                "unknown CACHE_BACKEND {:?}, expected \"redis\" or \"memory\"",
                other
            ))),
        }
    }
}

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: CacheBackend,
    pub redis: RedisStoreConfig,
    pub cache_ttl: Duration,
    pub origin_timeout: Duration,
    pub request_timeout: Duration,
    pub project_id: String,
    pub metric_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9889,
            backend: CacheBackend::Redis,
            redis: RedisStoreConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            origin_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            project_id: "census-demos".to_string(),
            metric_prefix: "cmstore".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse configuration from any variable source. Numbers that fail to
    /// parse fall back to their defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        let defaults = Config::default();

        let number = |name: &str| var(name).and_then(|v| v.trim().parse::<u64>().ok());
        let secs = |name: &str, default: Duration| {
            number(name).map(Duration::from_secs).unwrap_or(default)
        };

        let port = var("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let backend = match var("CACHE_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.backend,
        };

        let redis = RedisStoreConfig {
            addr: var("REDIS_SERVER_ADDR").unwrap_or(defaults.redis.addr),
            pool_size: var("REDIS_POOL_SIZE")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.redis.pool_size),
            idle_timeout: secs("REDIS_IDLE_TIMEOUT_SECS", defaults.redis.idle_timeout),
            connection_timeout: secs(
                "REDIS_CONNECT_TIMEOUT_SECS",
                defaults.redis.connection_timeout,
            ),
        };

        Ok(Self {
            port,
            backend,
            redis,
            cache_ttl: secs("CACHE_TTL_SECS", defaults.cache_ttl),
            origin_timeout: secs("ORIGIN_TIMEOUT_SECS", defaults.origin_timeout),
            request_timeout: secs("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            project_id: var("GCP_PROJECT_ID").unwrap_or(defaults.project_id),
            metric_prefix: var("GCP_METRIC_PREFIX").unwrap_or(defaults.metric_prefix),
        })
    }
}
