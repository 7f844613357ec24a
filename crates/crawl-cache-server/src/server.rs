//! HTTP server for the crawl cache
//!
//! Provides /health, /fetch and /purge endpoints.

use crate::service::CrawlService;
use crate::types::HealthResponse;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Shared state for the HTTP server
pub struct ServerState {
    pub service: CrawlService,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(service: CrawlService) -> Self {
        Self {
            service,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
///
/// Requests running longer than `request_timeout` are answered with 408 and
/// their in-flight origin and store calls are dropped.
pub fn create_router(state: SharedState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/fetch", post(fetch))
        .route("/purge", post(purge))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(router: Router, port: u16) -> std::io::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store = if state.service.store_healthy().await {
        "ok"
    } else {
        "unavailable"
    };
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        store: store.to_string(),
        stats: state.service.stats(),
    })
}

/// Return the body of the requested URL
///
/// The body is taken raw so clients that send no content type still get
/// their JSON decoded.
async fn fetch(State(state): State<SharedState>, body: Bytes) -> Response {
    match state.service.fetch(&body).await {
        Ok(fetched) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream"),
                (X_CACHE, fetched.source.as_header()),
            ],
            fetched.body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Drop the cached body of the requested URL
async fn purge(State(state): State<SharedState>, body: Bytes) -> Response {
    match state.service.purge(&body).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OriginError;
    use crate::origin::Origin;
    use crate::service::tests::{BrokenStore, FakeOrigin};
    use crate::service::DEFAULT_CACHE_TTL;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use crawl_cache_store::{CacheStore, MemoryStore};
    use tower::ServiceExt;

    /// Origin that takes far longer than any test timeout to answer
    struct SlowOrigin;

    #[async_trait]
    impl Origin for SlowOrigin {
        async fn get(&self, _url: &str) -> std::result::Result<Bytes, OriginError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Bytes::from_static(b"late"))
        }
    }

    fn create_test_router(store: Arc<dyn CacheStore>, origin: Arc<dyn Origin>) -> Router {
        create_test_router_with_timeout(store, origin, Duration::from_secs(10))
    }

    fn create_test_router_with_timeout(
        store: Arc<dyn CacheStore>,
        origin: Arc<dyn Origin>,
        request_timeout: Duration,
    ) -> Router {
        let service = CrawlService::new(store, origin, DEFAULT_CACHE_TTL);
        create_router(Arc::new(ServerState::new(service)), request_timeout)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_miss_then_hit() {
        let origin = Arc::new(FakeOrigin::default().with("https://example.com/world", b"world"));
        let router = create_test_router(Arc::new(MemoryStore::new()), origin.clone());

        let response = router
            .clone()
            .oneshot(post_json("/fetch", r#"{"url": "https://example.com/world"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "MISS");
        assert_eq!(&body_bytes(response).await[..], b"world");

        let response = router
            .oneshot(post_json("/fetch", r#"{"url": "https://example.com/world"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "HIT");
        assert_eq!(&body_bytes(response).await[..], b"world");
        assert_eq!(origin.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let router = create_test_router(
            Arc::new(MemoryStore::new()),
            Arc::new(FakeOrigin::default()),
        );

        let response = router
            .oneshot(post_json("/fetch", "not-json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let text = body_bytes(response).await;
        assert!(String::from_utf8_lossy(&text).starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_fetch_origin_failure_is_bad_request() {
        let router = create_test_router(
            Arc::new(MemoryStore::new()),
            Arc::new(FakeOrigin::default()),
        );

        let response = router
            .oneshot(post_json("/fetch", r#"{"url": "https://example.com/missing"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = body_bytes(response).await;
        assert!(String::from_utf8_lossy(&text).contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_timeout_drops_request() {
        let store = Arc::new(MemoryStore::new());
        let router = create_test_router_with_timeout(
            store.clone(),
            Arc::new(SlowOrigin),
            Duration::from_millis(100),
        );

        let response = router
            .oneshot(post_json("/fetch", r#"{"url": "https://example.com/slow"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        // The dropped fetch must never write its late body
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "https://example.com",
                Bytes::from_static(b"hello"),
                DEFAULT_CACHE_TTL,
            )
            .await
            .unwrap();
        let router = create_test_router(store.clone(), Arc::new(FakeOrigin::default()));

        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(post_json("/purge", r#"{"url": "https://example.com"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(body_bytes(response).await.is_empty());
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_errors() {
        let router = create_test_router(
            Arc::new(BrokenStore::default()),
            Arc::new(FakeOrigin::default()),
        );

        let response = router
            .clone()
            .oneshot(post_json("/purge", "{"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = router
            .oneshot(post_json("/purge", r#"{"url": "https://example.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = create_test_router(
            Arc::new(MemoryStore::new()),
            Arc::new(FakeOrigin::default()),
        );

        let response = router
            .oneshot(post_json("/non-existent", r#"{"url": "https://example.com"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_test_router(
            Arc::new(BrokenStore::default()),
            Arc::new(FakeOrigin::default()),
        );

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["store"], "unavailable");
        assert!(json["uptime_secs"].as_u64().is_some());
        assert_eq!(json["stats"]["hits"], 0);
    }
}
