//! Origin fetching

use crate::error::OriginError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Source of truth for a URL's body
#[async_trait]
pub trait Origin: Send + Sync {
    /// GET `url` once and return the full body
    async fn get(&self, url: &str) -> Result<Bytes, OriginError>;
}

/// HTTP client for fetching bodies from origin servers
///
/// Uses reqwest's default redirect policy; requests are not retried.
pub struct HttpOrigin {
    client: Client,
}

impl HttpOrigin {
    /// Create a new origin client that gives up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, OriginError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crawl-cache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

fn parse_url(url: &str) -> Result<Url, OriginError> {
    let parsed =
        Url::parse(url).map_err(|e| OriginError::InvalidUrl(format!("{:?}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(OriginError::InvalidUrl(format!(
            "unsupported scheme {:?}",
            scheme
        ))),
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn get(&self, url: &str) -> Result<Bytes, OriginError> {
        let url = parse_url(url)?;
        debug!(url = %url, "Fetching from origin");

        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Origin returned error status");
            return Err(OriginError::Status(response.status()));
        }

        let data = response.bytes().await?;
        debug!(url = %url, size = data.len(), "Fetched from origin");

        Ok(data)
    }
}
