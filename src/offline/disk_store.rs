//! On-disk cache store.
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   pyco-v2/
//!     <hex sha256(request url)>.json
//!   pyco-v1/
//!     ...
//! ```
//!
//! Every entry is written to a temp file and renamed into place, so readers
//! never observe a half-written entry. `store_all` builds the complete new
//! cache directory in a hidden staging directory and renames it into place
//! in one step; a failure before that leaves the old directory untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::error::{CacheError, CacheResult};
use super::request::AssetResponse;
use super::store::CacheStore;

const ENTRY_EXTENSION: &str = "json";
const STAGING_PREFIX: &str = ".staging-";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    url: String,
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl StoredEntry {
    fn from_response(url: &str, response: &AssetResponse) -> Self {
        Self {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body: STANDARD.encode(&response.body),
        }
    }

    fn into_response(self) -> CacheResult<AssetResponse> {
        let body = STANDARD.decode(self.body.as_bytes()).map_err(|e| {
            CacheError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        Ok(AssetResponse {
            status: self.status,
            headers: self.headers,
            body: body.into(),
        })
    }
}

/// Cache store persisted under a root directory
#[derive(Debug)]
pub struct DiskCacheStore {
    root: PathBuf,
    /// Held exclusively while a batch swaps a cache directory
    swap_lock: RwLock<()>,
}

impl DiskCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!("DiskCacheStore: rooted at {}", root.display());
        Ok(Self {
            root,
            swap_lock: RwLock::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, cache: &str) -> CacheResult<PathBuf> {
        if cache.is_empty()
            || cache.starts_with('.')
            || cache.contains(['/', '\\'])
            || cache.contains("..")
        {
            return Err(CacheError::InvalidCacheName(cache.to_string()));
        }
        Ok(self.root.join(cache))
    }

    /// Fixed-length name whatever the URL length; the stored `url` field
    /// tells colliding entries apart
    fn entry_file_name(url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        format!("{}.{}", hex::encode(digest), ENTRY_EXTENSION)
    }
}

/// Write `bytes` to `dir/file_name` through a temp file in the same directory
fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(dir.join(file_name)).map_err(|e| e.error)?;
    Ok(())
}

/// Build the full contents of `dir` (existing entries plus `entries`) in a
/// staging directory, then rename it over `dir`
fn commit_batch(root: &Path, dir: &Path, entries: &[(String, Vec<u8>)]) -> std::io::Result<()> {
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(root)?;
    let replacing = dir.exists();
    if replacing {
        for existing in std::fs::read_dir(dir)? {
            let existing = existing?;
            if existing.file_type()?.is_file() {
                let target = staging.path().join(existing.file_name());
                if std::fs::hard_link(existing.path(), &target).is_err() {
                    std::fs::copy(existing.path(), &target)?;
                }
            }
        }
    }
    for (file_name, bytes) in entries {
        std::fs::write(staging.path().join(file_name), bytes)?;
    }

    if !replacing {
        return std::fs::rename(staging.path(), dir);
    }

    let retired = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(root)?;
    std::fs::rename(dir, retired.path().join("previous"))?;
    if let Err(e) = std::fs::rename(staging.path(), dir) {
        // Keep the old contents on disk even if putting them back fails
        let retired = retired.into_path();
        std::fs::rename(retired.join("previous"), dir)?;
        let _ = std::fs::remove_dir(&retired);
        return Err(e);
    }
    Ok(())
}

async fn run_blocking<T, F>(f: F) -> CacheResult<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CacheError::Io(std::io::Error::other(e)))?
        .map_err(CacheError::Io)
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn cache_names(&self) -> CacheResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_cache(&self, name: &str) -> CacheResult<bool> {
        let dir = self.cache_dir(name)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!("DiskCacheStore: deleted cache {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn lookup(&self, cache: &str, url: &str) -> CacheResult<Option<AssetResponse>> {
        let path = self.cache_dir(cache)?.join(Self::entry_file_name(url));
        let _guard = self.swap_lock.read().await;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: StoredEntry = serde_json::from_str(&text)?;
        if entry.url != url {
            tracing::warn!(
                "DiskCacheStore: entry {} holds {} instead of {}",
                path.display(),
                entry.url,
                url
            );
            return Ok(None);
        }
        entry.into_response().map(Some)
    }

    async fn store(&self, cache: &str, url: &str, response: &AssetResponse) -> CacheResult<()> {
        let dir = self.cache_dir(cache)?;
        let bytes = serde_json::to_vec(&StoredEntry::from_response(url, response))?;
        let file_name = Self::entry_file_name(url);
        let _guard = self.swap_lock.read().await;
        run_blocking(move || write_atomically(&dir, &file_name, &bytes)).await
    }

    async fn store_all(
        &self,
        cache: &str,
        entries: &[(String, AssetResponse)],
    ) -> CacheResult<()> {
        let dir = self.cache_dir(cache)?;
        let mut serialized = Vec::with_capacity(entries.len());
        for (url, response) in entries {
            serialized.push((
                Self::entry_file_name(url),
                serde_json::to_vec(&StoredEntry::from_response(url, response))?,
            ));
        }

        let _guard = self.swap_lock.write().await;
        let root = self.root.clone();
        run_blocking(move || commit_batch(&root, &dir, &serialized)).await?;

        tracing::info!(
            "DiskCacheStore: stored {} entries in {}",
            entries.len(),
            cache
        );
        Ok(())
    }
}
