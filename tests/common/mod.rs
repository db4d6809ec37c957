//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use pycoterm::offline::AssetManifest;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Manifest pointing every asset at the mock server
pub fn manifest_for(server: &MockServer, cache_name: &str, assets: &[&str]) -> AssetManifest {
    AssetManifest {
        cache_name: cache_name.to_string(),
        origin: format!("{}/", server.uri()),
        runtime_hosts: vec!["cdn.jsdelivr.net".to_string()],
        assets: assets.iter().map(|a| a.to_string()).collect(),
    }
}

/// Serve `body` with status 200 for GET `route`
pub async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Write an INI config pointing the engine and the cache into `dir`
pub fn write_config(dir: &Path, download_url: &str, origin: &str) -> PathBuf {
    let config_path = dir.join("config");
    std::fs::write(
        &config_path,
        format!(
            "[engine]\ninstall_dir = {}\ndownload_url = {}\n\n\
             [web]\norigin = {}\ncache_dir = {}\ncache_name = pyco-test\ntimeout_secs = 5\n",
            dir.join("pyco").display(),
            download_url,
            origin,
            dir.join("cache").display(),
        ),
    )
    .unwrap();
    config_path
}
