//! Expiring key-value store for crawled URL bodies
//!
//! Entries live in a single `crawled` namespace, keyed by URL, and expire
//! after a fixed TTL. [`RedisStore`] talks to Redis through a bounded bb8
//! pool; [`MemoryStore`] keeps entries in a moka cache in process.

mod error;
mod memory;
mod redis_store;
mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use redis_store::{normalize_redis_addr, RedisStore, RedisStoreConfig};
pub use store::{
    clamp_ttl, namespaced_key, CacheResult, CacheStore, CRAWLED_NAMESPACE, MAX_ENTRY_TTL,
};
