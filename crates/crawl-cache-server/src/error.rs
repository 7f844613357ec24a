//! Error types for the crawl cache service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crawl_cache_store::StoreError;
use std::fmt;
use tracing::warn;

/// Failure fetching a URL from its origin
#[derive(Debug)]
pub enum OriginError {
    InvalidUrl(String),
    Http(Box<reqwest::Error>),
    Status(reqwest::StatusCode),
}

impl fmt::Display for OriginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            OriginError::Http(err) => write!(f, "HTTP error: {}", err),
            OriginError::Status(status) => write!(f, "Origin returned status {}", status),
        }
    }
}

impl std::error::Error for OriginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OriginError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OriginError {
    fn from(err: reqwest::Error) -> Self {
        OriginError::Http(Box::new(err))
    }
}

/// Request-level failure of a fetch or purge
///
/// `Origin` and `CacheWrite` are both fetch failures; `Store` only arises
/// from purges. Lookup failures never surface here, they fall through to the
/// origin.
#[derive(Debug)]
pub enum CrawlError {
    Validation(serde_json::Error),
    Store(StoreError),
    Origin(OriginError),
    CacheWrite(StoreError),
}

impl CrawlError {
    pub fn status(&self) -> StatusCode {
        match self {
            CrawlError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CrawlError::Store(_) | CrawlError::Origin(_) | CrawlError::CacheWrite(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlError::Validation(err) => write!(f, "Invalid request body: {}", err),
            CrawlError::Store(err) => write!(f, "{}", err),
            CrawlError::Origin(err) => write!(f, "Fetch failed: {}", err),
            CrawlError::CacheWrite(err) => write!(f, "Failed to cache response: {}", err),
        }
    }
}

impl std::error::Error for CrawlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrawlError::Validation(err) => Some(err),
            CrawlError::Store(err) | CrawlError::CacheWrite(err) => Some(err),
            CrawlError::Origin(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CrawlError {
    fn from(err: serde_json::Error) -> Self {
        CrawlError::Validation(err)
    }
}

impl From<OriginError> for CrawlError {
    fn from(err: OriginError) -> Self {
        CrawlError::Origin(err)
    }
}

impl IntoResponse for CrawlError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "Request failed");
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;

/// Startup failure of the server binary
#[derive(Debug)]
pub enum ServerError {
    Config(String),
    Store(StoreError),
    Origin(OriginError),
    Io(Box<std::io::Error>),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ServerError::Store(err) => write!(f, "{}", err),
            ServerError::Origin(err) => write!(f, "Origin client error: {}", err),
            ServerError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Store(err) => Some(err),
            ServerError::Origin(err) => Some(err),
            ServerError::Io(err) => Some(err.as_ref()),
            ServerError::Config(_) => None,
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::Store(err)
    }
}

impl From<OriginError> for ServerError {
    fn from(err: OriginError) -> Self {
        ServerError::Origin(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type ServerResult<T> = std::result::Result<T, ServerError>;
