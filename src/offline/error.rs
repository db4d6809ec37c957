//! Error type for the offline asset cache.

use thiserror::Error;

use super::manager::WorkerState;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// At least one manifest asset could not be fetched; nothing was stored
    #[error("install failed on {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("cannot {operation} while the worker is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: WorkerState,
    },

    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("invalid request method '{0}'")]
    InvalidMethod(String),

    #[error("invalid cache name '{0}'")]
    InvalidCacheName(String),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl CacheError {
    /// True when the failure happened before any response arrived.
    ///
    /// Network-first fetches fall back to the cache only for these.
    pub fn is_network(&self) -> bool {
        matches!(self, CacheError::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_are_recognised() {
        let err = CacheError::Network {
            url: "https://example.com/".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.is_network());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn install_failure_is_not_a_network_error() {
        let err = CacheError::InstallFailed {
            url: "./app.js".to_string(),
            reason: "status 404".to_string(),
        };
        assert!(!err.is_network());
        assert_eq!(err.to_string(), "install failed on ./app.js: status 404");
    }
}
