//! # Offline Asset Cache
//!
//! Keeps the web variant of pyco usable without a network connection by
//! serving a fixed, versioned list of static assets from a local store.
//!
//! ```text
//!   install ──▶ fetch every manifest asset ──▶ store_all(cache_name)
//!   activate ──▶ delete every cache whose name != cache_name
//!   fetch ──▶ classify ──┬─ LocalAsset / RuntimeDependency ──▶ cache-first
//!                        └─ External ─────────────────────────▶ network-first
//! ```
//!
//! The network and the store sit behind the [`Network`] and [`CacheStore`]
//! traits so the policy in [`CacheManager`] can be exercised without I/O.

pub mod disk_store;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod network;
pub mod request;
pub mod store;

pub use disk_store::DiskCacheStore;
pub use error::{CacheError, CacheResult};
pub use manager::{CacheManager, FetchOutcome, FetchSource, WorkerState};
pub use manifest::{AssetManifest, RequestPolicy, DEFAULT_CACHE_NAME};
pub use network::{HttpNetwork, Network};
pub use request::{AssetRequest, AssetResponse};
pub use store::{CacheStore, MemoryCacheStore};
