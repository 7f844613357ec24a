//! Redis-backed cache store with a bounded connection pool

use crate::error::Result;
use crate::store::{clamp_ttl, namespaced_key, CacheResult, CacheStore};
use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::redis::{self, Value};
use bb8_redis::RedisConnectionManager;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for [`RedisStore`]
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// `redis://host:port`, `host:port` or `:port`
    pub addr: String,
    /// Upper bound on pooled connections
    pub pool_size: u32,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
    /// How long an operation waits for a pooled connection
    pub connection_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            addr: ":6379".to_string(),
            pool_size: 5,
            idle_timeout: Duration::from_secs(300),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

/// Turn the short address forms into a Redis connection URL
pub fn normalize_redis_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.contains("://") {
        addr.to_string()
    } else if addr.starts_with(':') {
        format!("redis://127.0.0.1{}", addr)
    } else {
        format!("redis://{}", addr)
    }
}

/// Cache store backed by Redis
///
/// Entries are written with `SET ... EX`, so expiry is enforced by Redis
/// itself. Each operation checks a connection out of the pool and returns it
/// as soon as the command completes.
pub struct RedisStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisStore {
    /// Create a store. No connection is opened until the first operation,
    /// so this succeeds even while Redis is down.
    pub fn new(config: &RedisStoreConfig) -> Result<Self> {
        let manager = RedisConnectionManager::new(normalize_redis_addr(&config.addr))?;
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .min_idle(None)
            .idle_timeout(Some(config.idle_timeout))
            .connection_timeout(config.connection_timeout)
            .build_unchecked(manager);

        Ok(Self { pool })
    }
}

/// Interpret a `GET` reply. Anything other than bytes or nil is logged and
/// read as a miss.
pub(crate) fn decode_reply(key: &str, reply: Value) -> CacheResult {
    match reply {
        Value::BulkString(data) => CacheResult::Hit(Bytes::from(data)),
        Value::Nil => CacheResult::Miss,
        other => {
            warn!(key, reply = ?other, "Unexpected cache reply, treating as miss");
            CacheResult::Miss
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult {
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => return CacheResult::Error(e.into()),
        };

        let reply = redis::cmd("GET")
            .arg(namespaced_key(key))
            .query_async::<Value>(&mut *conn)
            .await;

        match reply {
            Ok(reply) => decode_reply(key, reply),
            Err(e) => CacheResult::Error(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let ttl_secs = clamp_ttl(ttl).as_secs().max(1);

        redis::cmd("SET")
            .arg(namespaced_key(key))
            .arg(value.as_ref())
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<()>(&mut *conn)
            .await?;

        debug!(key, size = value.len(), ttl_secs, "Stored cache entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;

        let removed: i64 = redis::cmd("DEL")
            .arg(namespaced_key(key))
            .query_async(&mut *conn)
            .await?;

        debug!(key, removed, "Deleted cache entry");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        redis::cmd("PING").query_async::<()>(&mut *conn).await?;
        Ok(())
    }
}
