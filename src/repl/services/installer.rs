//! # Engine Installer
//!
//! Downloads `pyco.py` and its README into the install directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://raw.githubusercontent.com/LeeHolmes/pyco/refs/heads/main";
pub const ENGINE_SCRIPT: &str = "pyco.py";
pub const README_FILE: &str = "README.md";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum DownloadError {
    /// No response arrived (DNS, connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    #[error("Download failed: {0}")]
    Failed(String),
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            DownloadError::Network(e.to_string())
        } else {
            DownloadError::Failed(e.to_string())
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        DownloadError::Failed(e.to_string())
    }
}

/// Unify `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub struct EngineInstaller {
    client: reqwest::Client,
    base_url: String,
    install_dir: PathBuf,
}

impl EngineInstaller {
    pub fn new(base_url: &str, install_dir: impl Into<PathBuf>) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DownloadError::Failed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            install_dir: install_dir.into(),
        })
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn script_path(&self) -> PathBuf {
        self.install_dir.join(ENGINE_SCRIPT)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.install_dir.join(README_FILE)
    }

    pub fn is_installed(&self) -> bool {
        self.script_path().is_file()
    }

    async fn download(&self, name: &str) -> Result<String, DownloadError> {
        let url = format!("{}/{}", self.base_url, name);
        tracing::debug!("Downloading {}", url);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| DownloadError::Failed(e.to_string()))?
            .text()
            .await?;
        Ok(normalize_newlines(&body))
    }

    /// Download both files; neither is written unless both arrived.
    ///
    /// Returns the success message shown to the user.
    pub async fn install(&self) -> Result<String, DownloadError> {
        let script = self.download(ENGINE_SCRIPT).await?;
        let readme = self.download(README_FILE).await?;

        tokio::fs::create_dir_all(&self.install_dir).await?;
        tokio::fs::write(self.script_path(), script).await?;
        tokio::fs::write(self.readme_path(), readme).await?;
        tracing::info!("Engine installed into {}", self.install_dir.display());
        Ok(format!("Downloaded {ENGINE_SCRIPT} and {README_FILE}"))
    }

    /// The README text, or a message saying how to get it
    pub async fn readme(&self) -> Result<String, String> {
        match tokio::fs::read_to_string(self.readme_path()).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(format!(
                "{README_FILE} not found in application directory.\nPress F2 to download the pyco files."
            )),
            Err(e) => Err(format!("Could not read {README_FILE}: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_are_normalized() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn download_errors_carry_user_facing_prefixes() {
        assert_eq!(
            DownloadError::Network("timed out".into()).to_string(),
            "Network error: timed out"
        );
        assert_eq!(
            DownloadError::Failed("404".into()).to_string(),
            "Download failed: 404"
        );
    }

    #[tokio::test]
    async fn readme_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let installer = EngineInstaller::new(DEFAULT_DOWNLOAD_URL, dir.path()).unwrap();
        assert!(!installer.is_installed());
        let message = installer.readme().await.unwrap_err();
        assert!(message.starts_with("README.md not found"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let dir = tempfile::tempdir().unwrap();
        // Port 9 on loopback: nothing listens, connection is refused
        let installer = EngineInstaller::new("http://127.0.0.1:9", dir.path()).unwrap();
        let err = installer.install().await.unwrap_err();
        assert!(matches!(err, DownloadError::Network(_)), "{err}");
        assert!(!installer.is_installed());
    }
}
