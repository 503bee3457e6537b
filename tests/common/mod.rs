//! Shared test utilities.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use mirrorstate::config::{BackendConfig, Config, ConfigStore, QueryConfig};
use mirrorstate::SyncClient;
use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// A host nothing listens on.
pub fn dead_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Config pointing at `host` with short timeouts and a fast retry.
pub fn test_config(host: &str) -> Config {
    Config {
        backend: BackendConfig {
            host: host.to_string(),
            connect_timeout_seconds: 1,
            request_timeout_seconds: 1,
        },
        query: QueryConfig {
            retry_interval_ms: 10,
            max_retry_attempts: 5,
            clear_while_fetching: true,
        },
    }
}

pub fn test_client(host: &str) -> SyncClient {
    let store = ConfigStore::new(test_config(host), PathBuf::from("unused.toml"));
    SyncClient::new(store).expect("Failed to build client")
}

/// Write `content` to a temporary config file.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
