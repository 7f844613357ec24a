//! Crawl cache server - caching URL fetch service
//!
//! Accepts URLs on /fetch, serves them from Redis when cached and from the
//! origin otherwise. /purge drops a cached URL.

use crawl_cache_server::{
    create_router, start_server, CacheBackend, Config, CrawlService, HttpOrigin, ServerError,
    ServerState, SharedState,
};
use crawl_cache_store::{normalize_redis_addr, CacheStore, MemoryStore, RedisStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("crawl_cache_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting crawl cache server...");

    let config = Config::from_env()?;
    info!("Port: {}", config.port);
    info!("Cache TTL: {} seconds", config.cache_ttl.as_secs());
    info!(
        project_id = %config.project_id,
        metric_prefix = %config.metric_prefix,
        "Observability identifiers"
    );

    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Redis => {
            info!(
                addr = %normalize_redis_addr(&config.redis.addr),
                pool_size = config.redis.pool_size,
                "Using Redis cache store"
            );
            Arc::new(RedisStore::new(&config.redis)?)
        }
        CacheBackend::Memory => {
            warn!("Using in-memory cache store, entries are not shared between processes");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(e) = store.ping().await {
        warn!(error = %e, "Cache store unreachable at startup, lookups will fall through to origin");
    }

    let origin = Arc::new(HttpOrigin::new(config.origin_timeout)?);
    let service = CrawlService::new(store, origin, config.cache_ttl);
    let state: SharedState = Arc::new(ServerState::new(service));

    // Start HTTP server (blocking)
    start_server(create_router(state, config.request_timeout), config.port).await?;

    Ok(())
}
