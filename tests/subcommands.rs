//! `pycoterm setup` and `pycoterm cache ...` end to end

mod common;

use pycoterm::cmd_args::{AppCommand, CacheAction, CommandLineArgs};
use pycoterm::config::AppConfig;
use pycoterm::subcommands;
use wiremock::MockServer;

use common::{serve, write_config};

async fn site() -> MockServer {
    let server = MockServer::start().await;
    for asset in pycoterm::offline::manifest::DEFAULT_ASSETS {
        let route = asset.trim_start_matches('.');
        serve(&server, route, &format!("content of {route}")).await;
    }
    serve(&server, "/pyco.py", "print('pyco')\r\n").await;
    serve(&server, "/README.md", "# pyco\n").await;
    server
}

fn cache_action(args: &[&str]) -> CacheAction {
    let mut argv = vec!["pycoterm", "cache"];
    argv.extend_from_slice(args);
    match CommandLineArgs::parse_from(argv).command() {
        Some(AppCommand::Cache { action }) => action.clone(),
        other => panic!("expected a cache command, got {other:?}"),
    }
}

async fn run_cache(args: &[&str], config: &AppConfig) -> String {
    let mut out = Vec::new();
    subcommands::cache(&cache_action(args), config, &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn setup_downloads_the_engine_into_the_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    let server = site().await;
    let config_path = write_config(dir.path(), &server.uri(), &format!("{}/", server.uri()));
    let config = AppConfig::load_file(&config_path).unwrap();

    let mut out = Vec::new();
    subcommands::setup(&config, &mut out).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.ends_with("Downloaded pyco.py and README.md\n"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("pyco").join("pyco.py")).unwrap(),
        "print('pyco')\n"
    );
}

#[tokio::test]
async fn cache_install_activate_fetch_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let server = site().await;
    let config_path = write_config(dir.path(), &server.uri(), &format!("{}/", server.uri()));
    let config = AppConfig::load_file(&config_path).unwrap();
    std::fs::create_dir_all(dir.path().join("cache").join("pyco-v1")).unwrap();

    let out = run_cache(&["install"], &config).await;
    assert_eq!(out, "Installed 13 assets into cache 'pyco-test'\n");

    let out = run_cache(&["activate"], &config).await;
    assert_eq!(out, "Deleted cache 'pyco-v1'\n");

    let out = run_cache(&["list"], &config).await;
    assert_eq!(out, "pyco-test\n");

    let url = format!("{}/app.js", server.uri());
    let out = run_cache(&["fetch", &url], &config).await;
    assert_eq!(out, format!("200 cache {} bytes\n", "content of /app.js".len()));

    let out = run_cache(&["fetch", &url, "-X", "POST"], &config).await;
    assert_eq!(out, "passthrough\n");
}

#[tokio::test]
async fn activate_before_install_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "http://127.0.0.1:9", "http://127.0.0.1:9/");
    let config = AppConfig::load_file(&config_path).unwrap();

    let mut out = Vec::new();
    let err = subcommands::cache(&cache_action(&["activate"]), &config, &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("pycoterm cache install"));
}
