//! Crawl cache service
//!
//! Serves URL bodies from a shared expiring cache, fetching from the origin
//! and populating the cache on a miss.

pub mod config;
pub mod error;
pub mod origin;
pub mod server;
pub mod service;
pub mod types;

pub use config::{CacheBackend, Config};
pub use error::{CrawlError, OriginError, Result, ServerError, ServerResult};
pub use origin::{HttpOrigin, Origin};
pub use server::{create_router, start_server, ServerState, SharedState};
pub use service::{CrawlService, Fetched, DEFAULT_CACHE_TTL};
pub use types::*;
