//! Named cache stores.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::CacheResult;
use super::request::AssetResponse;

/// A set of named caches, each mapping request URLs to stored responses
///
/// Implementations must make `store` and `store_all` atomic with respect to
/// `lookup`: a reader sees either the old entry or the complete new one, and
/// after `store_all` either every entry is present or none is.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Names of every cache currently present, sorted
    async fn cache_names(&self) -> CacheResult<Vec<String>>;

    /// Delete a cache and all its entries; false if it did not exist
    async fn delete_cache(&self, name: &str) -> CacheResult<bool>;

    async fn lookup(&self, cache: &str, url: &str) -> CacheResult<Option<AssetResponse>>;

    /// Store one entry, creating the cache if needed
    async fn store(&self, cache: &str, url: &str, response: &AssetResponse) -> CacheResult<()>;

    /// Store a batch of entries all-or-nothing
    async fn store_all(&self, cache: &str, entries: &[(String, AssetResponse)])
        -> CacheResult<()>;
}

type CacheMap = BTreeMap<String, HashMap<String, AssetResponse>>;

/// In-memory store, used by tests and short-lived sessions
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    caches: RwLock<CacheMap>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a cache (0 if absent)
    pub async fn entry_count(&self, cache: &str) -> usize {
        self.caches.read().await.get(cache).map_or(0, |c| c.len())
    }

    /// Create an empty cache, the way a previous release would have left one
    pub async fn create_cache(&self, cache: &str) {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default();
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn cache_names(&self) -> CacheResult<Vec<String>> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn delete_cache(&self, name: &str) -> CacheResult<bool> {
        Ok(self.caches.write().await.remove(name).is_some())
    }

    async fn lookup(&self, cache: &str, url: &str) -> CacheResult<Option<AssetResponse>> {
        Ok(self
            .caches
            .read()
            .await
            .get(cache)
            .and_then(|c| c.get(url))
            .cloned())
    }

    async fn store(&self, cache: &str, url: &str, response: &AssetResponse) -> CacheResult<()> {
        self.caches
            .write()
            .await
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn store_all(
        &self,
        cache: &str,
        entries: &[(String, AssetResponse)],
    ) -> CacheResult<()> {
        let mut caches = self.caches.write().await;
        let target = caches.entry(cache.to_string()).or_default();
        for (url, response) in entries {
            target.insert(url.clone(), response.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_should_round_trip_entries() {
        let store = MemoryCacheStore::new();
        let response = AssetResponse::new(200, "<html></html>");

        store
            .store("pyco-v2", "https://pyco.example/index.html", &response)
            .await
            .unwrap();

        let found = store
            .lookup("pyco-v2", "https://pyco.example/index.html")
            .await
            .unwrap();
        assert_eq!(found, Some(response));
        assert_eq!(
            store.lookup("pyco-v1", "https://pyco.example/index.html").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn memory_store_should_list_and_delete_caches() {
        let store = MemoryCacheStore::new();
        store.create_cache("pyco-v2").await;
        store.create_cache("pyco-v1").await;

        assert_eq!(
            store.cache_names().await.unwrap(),
            vec!["pyco-v1".to_string(), "pyco-v2".to_string()]
        );
        assert!(store.delete_cache("pyco-v1").await.unwrap());
        assert!(!store.delete_cache("pyco-v1").await.unwrap());
        assert_eq!(store.cache_names().await.unwrap(), vec!["pyco-v2".to_string()]);
    }
}
