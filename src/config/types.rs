use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Remote service connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every method path is appended to (e.g., "https://api.example.com").
    #[serde(default = "default_host")]
    pub host: String,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Whole-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Defaults applied to every query created by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Fixed delay between automatic retries of network failures (default: 1000).
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Automatic retries before giving up (default: 5, 0 disables retry).
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    /// Publish `Loading` while a new invocation is in flight (default: true).
    #[serde(default = "default_clear_while_fetching")]
    pub clear_while_fetching: bool,
}

fn default_host() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_request_timeout() -> u32 {
    30
}

fn default_retry_interval_ms() -> u64 {
    1000
}

fn default_max_retry_attempts() -> u32 {
    5
}

fn default_clear_while_fetching() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            max_retry_attempts: default_max_retry_attempts(),
            clear_while_fetching: default_clear_while_fetching(),
        }
    }
}
