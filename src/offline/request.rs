//! Request and response values passed between the cache policy, the network
//! and the store.

use bytes::Bytes;
use reqwest::Url;

use super::error::{CacheError, CacheResult};

/// An intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    method: String,
    url: Url,
}

impl AssetRequest {
    pub fn new(method: &str, url: &str) -> CacheResult<Self> {
        let method = method.trim();
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CacheError::InvalidMethod(method.to_string()));
        }
        let url = Url::parse(url).map_err(|_| CacheError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            method: method.to_ascii_uppercase(),
            url,
        })
    }

    pub fn get(url: &str) -> CacheResult<Self> {
        Self::new("GET", url)
    }

    pub fn from_url(method: &str, url: Url) -> CacheResult<Self> {
        Self::new(method, url.as_str())
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// The key under which responses to this request are cached
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }
}

/// A response as returned by the network or replayed from a cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl AssetResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Only plain 200 responses are ever written to a cache
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
