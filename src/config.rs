//! Configuration constants and utilities for pycoterm
//!
//! Settings live in an INI file with two sections:
//!
//! ```ini
//! [engine]
//! command = python3
//! args = -u my_engine.py          ; replaces the default bootstrap
//! install_dir = ~/.config/pyco
//! download_url = https://raw.githubusercontent.com/LeeHolmes/pyco/refs/heads/main
//!
//! [web]
//! origin = http://localhost:8000/
//! cache_dir = ~/.pycoterm/cache
//! cache_name = pyco-v2
//! runtime_hosts = cdn.jsdelivr.net, other.cdn
//! timeout_secs = 30
//! ```
//!
//! A missing file means defaults everywhere.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ini::Ini;

use crate::offline::AssetManifest;
use crate::repl::services::{EngineCommand, DEFAULT_DOWNLOAD_URL, DEFAULT_PYTHON};

/// Default config file path for pycoterm
pub const DEFAULT_CONFIG_PATH: &str = "~/.pycoterm/config";

/// Environment variable name for overriding the config path
pub const CONFIG_PATH_ENV_VAR: &str = "PYCOTERM_CONFIG_PATH";

/// Environment variable holding the log filter
pub const LOG_LEVEL_ENV_VAR: &str = "PYCOTERM_LOG_LEVEL";

const DEFAULT_WEB_TIMEOUT_SECS: u64 = 30;

/// Get the config file path, checking environment variable first, then falling back to default
pub fn get_config_path() -> String {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| format!("Cannot expand '{path}'"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn home_dir() -> PathBuf {
    expand_path("~").unwrap_or_else(|_| PathBuf::from("."))
}

/// Per-user directory holding `pyco.py` and its README
pub fn app_data_dir() -> PathBuf {
    if cfg!(windows) {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("pyco");
        }
    } else if cfg!(target_os = "macos") {
        return home_dir().join("Library/Application Support/pyco");
    } else if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("pyco");
    }
    home_dir().join(".config").join("pyco")
}

fn default_cache_dir() -> PathBuf {
    home_dir().join(".pycoterm").join("cache")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub command: String,
    /// Replaces the default bootstrap arguments when set
    pub args: Option<Vec<String>>,
    pub install_dir: PathBuf,
    pub download_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_PYTHON.to_string(),
            args: None,
            install_dir: app_data_dir(),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn engine_command(&self) -> EngineCommand {
        match &self.args {
            Some(args) => EngineCommand::new(&self.command, args.clone()),
            None => EngineCommand::python(&self.command, &self.install_dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub origin: Option<String>,
    pub cache_dir: PathBuf,
    pub cache_name: Option<String>,
    pub runtime_hosts: Option<Vec<String>>,
    pub timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            origin: None,
            cache_dir: default_cache_dir(),
            cache_name: None,
            runtime_hosts: None,
            timeout: Duration::from_secs(DEFAULT_WEB_TIMEOUT_SECS),
        }
    }
}

impl WebConfig {
    /// Overlay the configured origin, cache name and hosts on a manifest
    pub fn apply_to(&self, manifest: &mut AssetManifest) {
        if let Some(origin) = &self.origin {
            manifest.origin = origin.clone();
        }
        if let Some(name) = &self.cache_name {
            manifest.cache_name = name.clone();
        }
        if let Some(hosts) = &self.runtime_hosts {
            manifest.runtime_hosts = hosts.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub web: WebConfig,
}

impl AppConfig {
    /// Load from `path` (or the default location); a missing file yields
    /// defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let raw = path.map(str::to_string).unwrap_or_else(get_config_path);
        let path = expand_path(&raw)?;
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let ini = Ini::load_from_file(path)
            .map_err(|e| anyhow!("Failed to read config {}: {e}", path.display()))?;
        Self::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let mut config = Self::default();

        if let Some(engine) = ini.section(Some("engine")) {
            if let Some(command) = engine.get("command") {
                config.engine.command = command.trim().to_string();
            }
            if let Some(args) = engine.get("args") {
                config.engine.args = Some(args.split_whitespace().map(str::to_string).collect());
            }
            if let Some(dir) = engine.get("install_dir") {
                config.engine.install_dir = expand_path(dir.trim())?;
            }
            if let Some(url) = engine.get("download_url") {
                config.engine.download_url = url.trim().to_string();
            }
        }

        if let Some(web) = ini.section(Some("web")) {
            config.web.origin = web.get("origin").map(|v| v.trim().to_string());
            config.web.cache_name = web.get("cache_name").map(|v| v.trim().to_string());
            config.web.runtime_hosts = web.get("runtime_hosts").map(split_list);
            if let Some(dir) = web.get("cache_dir") {
                config.web.cache_dir = expand_path(dir.trim())?;
            }
            if let Some(secs) = web.get("timeout_secs") {
                let secs: u64 = secs
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid [web] timeout_secs '{secs}'"))?;
                config.web.timeout = Duration::from_secs(secs);
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "~/.pycoterm/config");
    }

    #[test]
    fn test_get_config_path_env_override() {
        let original = std::env::var_os(CONFIG_PATH_ENV_VAR);

        let test_path = "/custom/pycoterm/config";
        std::env::set_var(CONFIG_PATH_ENV_VAR, test_path);
        assert_eq!(get_config_path(), test_path);

        match original {
            Some(val) => std::env::set_var(CONFIG_PATH_ENV_VAR, val),
            None => std::env::remove_var(CONFIG_PATH_ENV_VAR),
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let config = AppConfig::load(path.to_str()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.engine.install_dir.ends_with("pyco"));
    }

    #[test]
    fn sections_override_defaults() {
        let ini = Ini::load_from_str(
            "[engine]\ncommand = python3.12\ninstall_dir = /opt/pyco\n\
             [web]\norigin = https://pyco.example/\ncache_name = pyco-v3\n\
             runtime_hosts = cdn.jsdelivr.net, unpkg.com\ntimeout_secs = 5\n",
        )
        .unwrap();
        let config = AppConfig::from_ini(&ini).unwrap();

        assert_eq!(config.engine.command, "python3.12");
        assert_eq!(config.engine.install_dir, PathBuf::from("/opt/pyco"));
        assert_eq!(config.web.timeout, Duration::from_secs(5));

        let mut manifest = AssetManifest::default();
        config.web.apply_to(&mut manifest);
        assert_eq!(manifest.origin, "https://pyco.example/");
        assert_eq!(manifest.cache_name, "pyco-v3");
        assert_eq!(manifest.runtime_hosts, ["cdn.jsdelivr.net", "unpkg.com"]);
        assert_eq!(manifest.assets.len(), 13);
    }

    #[test]
    fn engine_args_replace_bootstrap() {
        let ini = Ini::load_from_str("[engine]\ncommand = pyco\nargs = --quiet --plain\n").unwrap();
        let command = AppConfig::from_ini(&ini).unwrap().engine.engine_command();
        assert_eq!(command.program, "pyco");
        assert_eq!(command.args, ["--quiet", "--plain"]);
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let ini = Ini::load_from_str("[web]\ntimeout_secs = soon\n").unwrap();
        let err = AppConfig::from_ini(&ini).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
