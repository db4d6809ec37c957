//! The versioned asset manifest of the web variant.

use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::error::{CacheError, CacheResult};
use super::request::AssetRequest;

/// Bump on every release of the web variant; stale caches are evicted on activate
pub const DEFAULT_CACHE_NAME: &str = "pyco-v2";

/// CDN hosting the in-browser Python runtime
pub const DEFAULT_RUNTIME_HOSTS: &[&str] = &["cdn.jsdelivr.net"];

pub const DEFAULT_ORIGIN: &str = "http://localhost:8000/";

pub const DEFAULT_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./app.js",
    "./terminal.js",
    "./highlight.js",
    "./completion.js",
    "./pyco.py",
    "./manifest.json",
    "./favicon.ico",
    "./icons/icon-72.png",
    "./icons/icon-192.png",
    "./icons/icon-512.png",
    "./icons/apple-touch-icon.png",
];

/// How an intercepted GET is served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPolicy {
    /// Same origin as the app: cache-first
    LocalAsset,
    /// Known CDN dependency: cache-first so the runtime works offline
    RuntimeDependency,
    /// Anything else: network-first
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub cache_name: String,
    pub origin: String,
    #[serde(default)]
    pub runtime_hosts: Vec<String>,
    pub assets: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            runtime_hosts: DEFAULT_RUNTIME_HOSTS.iter().map(|h| h.to_string()).collect(),
            assets: DEFAULT_ASSETS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl AssetManifest {
    /// Load a manifest from a JSON file
    pub fn load(path: &Path) -> CacheResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> CacheResult<()> {
        let name = self.cache_name.as_str();
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
        {
            return Err(CacheError::InvalidCacheName(self.cache_name.clone()));
        }
        self.origin_url()?;
        Ok(())
    }

    pub fn origin_url(&self) -> CacheResult<Url> {
        Url::parse(&self.origin).map_err(|_| CacheError::InvalidUrl(self.origin.clone()))
    }

    /// Resolve a manifest-relative path (`./index.html`) against the origin
    pub fn resolve(&self, path: &str) -> CacheResult<Url> {
        self.origin_url()?
            .join(path)
            .map_err(|_| CacheError::InvalidUrl(path.to_string()))
    }

    /// Absolute URLs of every asset, in manifest order
    pub fn asset_urls(&self) -> CacheResult<Vec<Url>> {
        self.assets.iter().map(|a| self.resolve(a)).collect()
    }

    pub fn classify(&self, request: &AssetRequest) -> RequestPolicy {
        let same_origin = self
            .origin_url()
            .map(|origin| origin.origin() == request.url().origin())
            .unwrap_or(false);
        if same_origin {
            return RequestPolicy::LocalAsset;
        }

        let url = request.url().as_str();
        if self
            .runtime_hosts
            .iter()
            .any(|host| !host.is_empty() && url.contains(host.as_str()))
        {
            RequestPolicy::RuntimeDependency
        } else {
            RequestPolicy::External
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_lists_thirteen_assets() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.assets.len(), 13);
        assert_eq!(manifest.cache_name, "pyco-v2");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn relative_assets_resolve_against_origin() {
        let manifest = AssetManifest {
            origin: "https://pyco.example/app/".to_string(),
            ..AssetManifest::default()
        };
        assert_eq!(
            manifest.resolve("./index.html").unwrap().as_str(),
            "https://pyco.example/app/index.html"
        );
        assert_eq!(
            manifest.resolve("./").unwrap().as_str(),
            "https://pyco.example/app/"
        );
    }

    #[test]
    fn classify_should_split_local_runtime_and_external() {
        let manifest = AssetManifest {
            origin: "https://pyco.example/".to_string(),
            ..AssetManifest::default()
        };

        let local = AssetRequest::get("https://pyco.example/app.js").unwrap();
        let runtime =
            AssetRequest::get("https://cdn.jsdelivr.net/pyodide/v0.26.1/full/pyodide.js")
                .unwrap();
        let external = AssetRequest::get("https://fonts.example.org/crt.woff2").unwrap();

        assert_eq!(manifest.classify(&local), RequestPolicy::LocalAsset);
        assert_eq!(manifest.classify(&runtime), RequestPolicy::RuntimeDependency);
        assert_eq!(manifest.classify(&external), RequestPolicy::External);
    }

    #[test]
    fn different_port_is_not_same_origin() {
        let manifest = AssetManifest {
            origin: "http://localhost:8000/".to_string(),
            ..AssetManifest::default()
        };
        let other = AssetRequest::get("http://localhost:9000/app.js").unwrap();
        assert_eq!(manifest.classify(&other), RequestPolicy::External);
    }

    #[test]
    fn validate_rejects_path_like_cache_names() {
        for name in ["", "../evil", "a/b", ".hidden"] {
            let manifest = AssetManifest {
                cache_name: name.to_string(),
                ..AssetManifest::default()
            };
            assert!(matches!(
                manifest.validate(),
                Err(CacheError::InvalidCacheName(_))
            ));
        }
    }

    #[test]
    fn manifest_should_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(
            &path,
            r#"{"cache_name":"pyco-v3","origin":"https://pyco.example/","assets":["./index.html"]}"#,
        )
        .unwrap();

        let manifest = AssetManifest::load(&path).unwrap();
        assert_eq!(manifest.cache_name, "pyco-v3");
        assert!(manifest.runtime_hosts.is_empty());
        assert_eq!(manifest.assets, vec!["./index.html".to_string()]);
    }
}
