//! Engine download against a mock file server

mod common;

use pycoterm::repl::services::{DownloadError, EngineInstaller, ENGINE_SCRIPT, README_FILE};
use wiremock::MockServer;

use common::{serve, serve_status};

#[tokio::test]
async fn install_writes_both_files_with_unix_newlines() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    serve(&server, "/pyco.py", "print('pyco')\r\nx = 1\r\n").await;
    serve(&server, "/README.md", "# pyco\r\n").await;

    let installer = EngineInstaller::new(&server.uri(), dir.path().join("pyco")).unwrap();
    assert!(!installer.is_installed());

    let message = installer.install().await.unwrap();
    assert_eq!(message, "Downloaded pyco.py and README.md");
    assert!(installer.is_installed());
    assert_eq!(
        std::fs::read_to_string(installer.script_path()).unwrap(),
        "print('pyco')\nx = 1\n"
    );
    assert_eq!(installer.readme().await.unwrap(), "# pyco\n");
}

#[tokio::test]
async fn missing_readme_fails_without_writing_the_script() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    serve(&server, "/pyco.py", "print('pyco')\n").await;
    serve_status(&server, "/README.md", 404).await;

    let installer = EngineInstaller::new(&server.uri(), dir.path()).unwrap();
    let err = installer.install().await.unwrap_err();

    assert!(matches!(err, DownloadError::Failed(_)));
    assert!(err.to_string().starts_with("Download failed:"));
    assert!(!dir.path().join(ENGINE_SCRIPT).exists());
    assert!(!dir.path().join(README_FILE).exists());
}

#[tokio::test]
async fn trailing_slash_on_base_url_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    serve(&server, "/pyco.py", "1\n").await;
    serve(&server, "/README.md", "2\n").await;

    let installer = EngineInstaller::new(&format!("{}/", server.uri()), dir.path()).unwrap();
    installer.install().await.unwrap();
    assert!(installer.is_installed());
}
