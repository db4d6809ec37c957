//! Install / activate / fetch lifecycle of the offline cache.
//!
//! The manager walks the same states a browser service worker does:
//!
//! ```text
//! Parsed --install--> Installing --ok--> Installed --activate--> Activating --> Activated
//!                          \--err--> Redundant
//! ```
//!
//! `handle_fetch` is usable in every state; before installation it simply
//! misses the cache.

use super::error::{CacheError, CacheResult};
use super::manifest::{AssetManifest, RequestPolicy};
use super::network::Network;
use super::request::{AssetRequest, AssetResponse};
use super::store::CacheStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

impl std::fmt::Display for FetchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchSource::Cache => write!(f, "cache"),
            FetchSource::Network => write!(f, "network"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller performs the request itself
    Passthrough,
    Response {
        response: AssetResponse,
        source: FetchSource,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&AssetResponse> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Response { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<FetchSource> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Response { source, .. } => Some(*source),
        }
    }
}

pub struct CacheManager<N: Network, S: CacheStore> {
    manifest: AssetManifest,
    network: N,
    store: S,
    state: WorkerState,
    claims_clients: bool,
}

impl<N: Network, S: CacheStore> CacheManager<N, S> {
    pub fn new(manifest: AssetManifest, network: N, store: S) -> Self {
        Self {
            manifest,
            network,
            store,
            state: WorkerState::Parsed,
            claims_clients: false,
        }
    }

    /// Reattach to a store populated by an earlier run.
    ///
    /// The manager starts `Installed` when the current cache already exists,
    /// `Parsed` otherwise.
    pub async fn resume(manifest: AssetManifest, network: N, store: S) -> CacheResult<Self> {
        let installed = store
            .cache_names()
            .await?
            .iter()
            .any(|name| *name == manifest.cache_name);
        let mut manager = Self::new(manifest, network, store);
        if installed {
            manager.state = WorkerState::Installed;
        }
        tracing::debug!("CacheManager: resumed in state {:?}", manager.state);
        Ok(manager)
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn claims_clients(&self) -> bool {
        self.claims_clients
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch every manifest asset and store them under the current cache name.
    ///
    /// Nothing is stored unless every asset came back with status 200.
    pub async fn install(&mut self) -> CacheResult<()> {
        if self.state != WorkerState::Parsed {
            return Err(CacheError::InvalidState {
                operation: "install",
                state: self.state,
            });
        }

        self.state = WorkerState::Installing;
        tracing::info!(
            "CacheManager: installing {} assets into {}",
            self.manifest.assets.len(),
            self.manifest.cache_name
        );

        match self.fetch_all_assets().await {
            Ok(entries) => {
                if let Err(e) = self.store.store_all(&self.manifest.cache_name, &entries).await {
                    self.state = WorkerState::Redundant;
                    return Err(e);
                }
                self.state = WorkerState::Installed;
                tracing::info!("CacheManager: installed {}", self.manifest.cache_name);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("CacheManager: install failed: {}", e);
                self.state = WorkerState::Redundant;
                Err(e)
            }
        }
    }

    async fn fetch_all_assets(&self) -> CacheResult<Vec<(String, AssetResponse)>> {
        let mut entries = Vec::with_capacity(self.manifest.assets.len());
        for asset in &self.manifest.assets {
            let install_failed = |reason: String| CacheError::InstallFailed {
                url: asset.clone(),
                reason,
            };

            let url = self.manifest.resolve(asset)?;
            let request = AssetRequest::from_url("GET", url)?;
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| install_failed(e.to_string()))?;
            if !response.is_cacheable() {
                return Err(install_failed(format!("status {}", response.status)));
            }
            entries.push((request.cache_key().to_string(), response));
        }
        Ok(entries)
    }

    /// Delete every cache but the current one; returns the deleted names
    pub async fn activate(&mut self) -> CacheResult<Vec<String>> {
        if !matches!(self.state, WorkerState::Installed | WorkerState::Activated) {
            return Err(CacheError::InvalidState {
                operation: "activate",
                state: self.state,
            });
        }

        self.state = WorkerState::Activating;
        let mut deleted = Vec::new();
        for name in self.store.cache_names().await? {
            if name == self.manifest.cache_name {
                continue;
            }
            if self.store.delete_cache(&name).await? {
                tracing::info!("CacheManager: evicted stale cache {}", name);
                deleted.push(name);
            }
        }

        self.claims_clients = true;
        self.state = WorkerState::Activated;
        Ok(deleted)
    }

    /// Serve one intercepted request
    pub async fn handle_fetch(&self, request: &AssetRequest) -> CacheResult<FetchOutcome> {
        if !request.is_get() {
            tracing::debug!(
                "CacheManager: passthrough {} {}",
                request.method(),
                request.url()
            );
            return Ok(FetchOutcome::Passthrough);
        }

        match self.manifest.classify(request) {
            RequestPolicy::LocalAsset | RequestPolicy::RuntimeDependency => {
                self.cache_first(request).await
            }
            RequestPolicy::External => self.network_first(request).await,
        }
    }

    async fn cache_first(&self, request: &AssetRequest) -> CacheResult<FetchOutcome> {
        if let Some(response) = self.cached(request).await? {
            tracing::debug!("CacheManager: cache hit {}", request.url());
            return Ok(FetchOutcome::Response {
                response,
                source: FetchSource::Cache,
            });
        }

        let response = self.network.fetch(request).await?;
        self.store_if_cacheable(request, &response).await;
        Ok(FetchOutcome::Response {
            response,
            source: FetchSource::Network,
        })
    }

    async fn network_first(&self, request: &AssetRequest) -> CacheResult<FetchOutcome> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_if_cacheable(request, &response).await;
                Ok(FetchOutcome::Response {
                    response,
                    source: FetchSource::Network,
                })
            }
            Err(e) if e.is_network() => match self.cached(request).await? {
                Some(response) => {
                    tracing::debug!(
                        "CacheManager: network failed for {}, serving cached copy",
                        request.url()
                    );
                    Ok(FetchOutcome::Response {
                        response,
                        source: FetchSource::Cache,
                    })
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn cached(&self, request: &AssetRequest) -> CacheResult<Option<AssetResponse>> {
        self.store
            .lookup(&self.manifest.cache_name, request.cache_key())
            .await
    }

    /// Caching a fresh response is a side effect; failing to write it never
    /// fails the fetch
    async fn store_if_cacheable(&self, request: &AssetRequest, response: &AssetResponse) {
        if !response.is_cacheable() {
            return;
        }
        if let Err(e) = self
            .store
            .store(&self.manifest.cache_name, request.cache_key(), response)
            .await
        {
            tracing::warn!(
                "CacheManager: could not cache {}: {}",
                request.url(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::offline::MemoryCacheStore;

    /// Serves fixed responses per URL; unknown URLs fail as network errors
    #[derive(Default)]
    struct StubNetwork {
        responses: HashMap<String, u16>,
        calls: AtomicUsize,
    }

    impl StubNetwork {
        fn with(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(url.to_string(), status);
            self
        }
    }

    #[async_trait]
    impl Network for StubNetwork {
        async fn fetch(&self, request: &AssetRequest) -> CacheResult<AssetResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(request.url().as_str()) {
                Some(status) => Ok(AssetResponse::new(*status, request.url().to_string())),
                None => Err(CacheError::Network {
                    url: request.url().to_string(),
                    message: "unreachable".to_string(),
                }),
            }
        }
    }

    fn small_manifest() -> AssetManifest {
        AssetManifest {
            cache_name: "pyco-v2".to_string(),
            origin: "https://pyco.example/".to_string(),
            runtime_hosts: vec!["cdn.jsdelivr.net".to_string()],
            assets: vec!["./".to_string(), "./app.js".to_string()],
        }
    }

    #[tokio::test]
    async fn install_is_only_allowed_once() {
        let network = StubNetwork::default()
            .with("https://pyco.example/", 200)
            .with("https://pyco.example/app.js", 200);
        let mut manager = CacheManager::new(small_manifest(), network, MemoryCacheStore::new());

        manager.install().await.unwrap();
        assert_eq!(manager.state(), WorkerState::Installed);
        assert!(matches!(
            manager.install().await,
            Err(CacheError::InvalidState {
                operation: "install",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn failed_install_should_store_nothing() {
        let network = StubNetwork::default()
            .with("https://pyco.example/", 200)
            .with("https://pyco.example/app.js", 404);
        let mut manager = CacheManager::new(small_manifest(), network, MemoryCacheStore::new());

        let err = manager.install().await.unwrap_err();
        assert!(matches!(err, CacheError::InstallFailed { ref url, .. } if url == "./app.js"));
        assert_eq!(manager.state(), WorkerState::Redundant);
        assert_eq!(manager.store().entry_count("pyco-v2").await, 0);
        assert!(manager.store().cache_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn activate_requires_install() {
        let mut manager =
            CacheManager::new(small_manifest(), StubNetwork::default(), MemoryCacheStore::new());
        assert!(matches!(
            manager.activate().await,
            Err(CacheError::InvalidState {
                operation: "activate",
                state: WorkerState::Parsed
            })
        ));
        assert!(!manager.claims_clients());
    }

    #[tokio::test]
    async fn resume_should_detect_existing_cache() {
        let store = MemoryCacheStore::new();
        store.create_cache("pyco-v2").await;
        let mut manager = CacheManager::resume(small_manifest(), StubNetwork::default(), store)
            .await
            .unwrap();
        assert_eq!(manager.state(), WorkerState::Installed);
        assert!(manager.activate().await.unwrap().is_empty());
        assert_eq!(manager.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn network_first_should_surface_error_without_cached_copy() {
        let manager =
            CacheManager::new(small_manifest(), StubNetwork::default(), MemoryCacheStore::new());
        let request = AssetRequest::get("https://fonts.example.org/crt.woff2").unwrap();
        let err = manager.handle_fetch(&request).await.unwrap_err();
        assert!(err.is_network());
    }

    /// Reads as empty and refuses every write
    struct ReadOnlyStore;

    #[async_trait]
    impl CacheStore for ReadOnlyStore {
        async fn cache_names(&self) -> CacheResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn delete_cache(&self, _name: &str) -> CacheResult<bool> {
            Ok(false)
        }

        async fn lookup(&self, _cache: &str, _url: &str) -> CacheResult<Option<AssetResponse>> {
            Ok(None)
        }

        async fn store(&self, _cache: &str, _url: &str, _response: &AssetResponse) -> CacheResult<()> {
            Err(CacheError::Io(std::io::Error::other("read-only store")))
        }

        async fn store_all(
            &self,
            _cache: &str,
            _entries: &[(String, AssetResponse)],
        ) -> CacheResult<()> {
            Err(CacheError::Io(std::io::Error::other("read-only store")))
        }
    }

    #[tokio::test]
    async fn failed_cache_write_still_returns_network_response() {
        let local = "https://pyco.example/app.js";
        let external = "https://api.example.org/rates";
        let network = StubNetwork::default().with(local, 200).with(external, 200);
        let manager = CacheManager::new(small_manifest(), network, ReadOnlyStore);

        for url in [local, external] {
            let outcome = manager
                .handle_fetch(&AssetRequest::get(url).unwrap())
                .await
                .unwrap();
            assert_eq!(outcome.source(), Some(FetchSource::Network));
            assert_eq!(outcome.response().unwrap().status, 200);
        }
    }
}
