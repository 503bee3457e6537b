use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable overriding `backend.host`.
pub const HOST_ENV_VAR: &str = "MIRRORSTATE_HOST";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/mirrorstate/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("mirrorstate").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, starts from `Config::default()`.
    /// - If the file exists, parses it as TOML.
    /// - Applies the `MIRRORSTATE_HOST` override, then validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        } else {
            Config::default()
        };

        if let Ok(host) = std::env::var(HOST_ENV_VAR) {
            if !host.trim().is_empty() {
                config.backend.host = host;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The host is an http(s) URL
    /// - Timeouts and the retry interval are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.backend.host.trim();
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("Backend host '{}' must be an http(s) URL", host),
            });
        }

        if self.backend.connect_timeout_seconds == 0 || self.backend.request_timeout_seconds == 0
        {
            return Err(ConfigError::ValidationError {
                message: "Backend timeouts must be greater than zero".to_string(),
            });
        }

        if self.query.retry_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "Query retry interval must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
