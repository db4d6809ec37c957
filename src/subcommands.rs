//! Non-interactive subcommands: engine setup and the offline cache tools.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::cmd_args::CacheAction;
use crate::config::AppConfig;
use crate::offline::{
    AssetManifest, AssetRequest, CacheManager, CacheStore, DiskCacheStore, FetchOutcome,
    HttpNetwork, WorkerState,
};
use crate::repl::services::EngineInstaller;

type DiskCacheManager = CacheManager<HttpNetwork, DiskCacheStore>;

/// `pycoterm setup`
pub async fn setup(config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let installer = EngineInstaller::new(&config.engine.download_url, &config.engine.install_dir)?;
    writeln!(
        out,
        "Downloading pyco.py and README.md into {}...",
        installer.install_dir().display()
    )?;
    let message = installer.install().await?;
    writeln!(out, "{message}")?;
    Ok(())
}

fn load_manifest(config: &AppConfig, path: Option<&Path>) -> Result<AssetManifest> {
    let mut manifest = match path {
        Some(path) => AssetManifest::load(path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?,
        None => AssetManifest::default(),
    };
    config.web.apply_to(&mut manifest);
    manifest.validate()?;
    Ok(manifest)
}

async fn open_manager(config: &AppConfig, manifest: AssetManifest) -> Result<DiskCacheManager> {
    let network = HttpNetwork::new(config.web.timeout)?;
    let store = DiskCacheStore::new(&config.web.cache_dir)?;
    Ok(CacheManager::resume(manifest, network, store).await?)
}

/// `pycoterm cache ...`
pub async fn cache(action: &CacheAction, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    match action {
        CacheAction::Install { manifest } => {
            let manifest = load_manifest(config, manifest.as_deref())?;
            let network = HttpNetwork::new(config.web.timeout)?;
            let store = DiskCacheStore::new(&config.web.cache_dir)?;
            let count = manifest.assets.len();
            let mut manager = CacheManager::new(manifest, network, store);
            manager.install().await?;
            writeln!(
                out,
                "Installed {} assets into cache '{}'",
                count,
                manager.manifest().cache_name
            )?;
        }
        CacheAction::Activate => {
            let mut manager = open_manager(config, load_manifest(config, None)?).await?;
            if manager.state() == WorkerState::Parsed {
                return Err(anyhow!(
                    "Cache '{}' is not installed; run `pycoterm cache install` first",
                    manager.manifest().cache_name
                ));
            }
            let deleted = manager.activate().await?;
            if deleted.is_empty() {
                writeln!(out, "No stale caches")?;
            }
            for name in deleted {
                writeln!(out, "Deleted cache '{name}'")?;
            }
        }
        CacheAction::Fetch { url, method } => {
            let manager = open_manager(config, load_manifest(config, None)?).await?;
            let request = AssetRequest::new(method, url)?;
            match manager.handle_fetch(&request).await? {
                FetchOutcome::Passthrough => writeln!(out, "passthrough")?,
                FetchOutcome::Response { response, source } => writeln!(
                    out,
                    "{} {} {} bytes",
                    response.status,
                    source,
                    response.body.len()
                )?,
            }
        }
        CacheAction::List => {
            let store = DiskCacheStore::new(&config.web.cache_dir)?;
            for name in store.cache_names().await? {
                writeln!(out, "{name}")?;
            }
        }
    }
    Ok(())
}
