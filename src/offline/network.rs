//! Network access for the cache manager.

use std::time::Duration;

use async_trait::async_trait;

use super::error::{CacheError, CacheResult};
use super::request::{AssetRequest, AssetResponse};

/// Source of fresh responses
///
/// An `Err` means no response was obtained at all. Non-2xx statuses are
/// successful fetches and come back as `Ok`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> CacheResult<AssetResponse>;
}

/// Network backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> CacheResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CacheError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AssetRequest) -> CacheResult<AssetResponse> {
        let url = request.url().as_str().to_string();
        let method = reqwest::Method::from_bytes(request.method().as_bytes())
            .map_err(|_| CacheError::InvalidMethod(request.method().to_string()))?;

        tracing::debug!("HttpNetwork: {} {}", method, url);
        let network_error = |e: reqwest::Error| CacheError::Network {
            url: url.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .request(method, request.url().clone())
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(network_error)?;

        tracing::debug!("HttpNetwork: {} -> {} ({} bytes)", url, status, body.len());
        Ok(AssetResponse {
            status,
            headers,
            body,
        })
    }
}
