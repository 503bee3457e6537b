//! Shared, reloadable configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::loader::ConfigError;
use crate::config::types::{BackendConfig, Config};
use crate::query::QueryOptions;

/// Configuration shared by the client and the queries it creates.
///
/// Reloading affects queries created afterwards. Live queries keep the
/// options they were built with.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<Config>>,
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Load `path` (defaults if missing) and wrap the result.
    pub fn open(path: PathBuf) -> Result<Self, ConfigError> {
        let config = Config::load_from(&path)?;
        Ok(Self::new(config, path))
    }

    pub fn get(&self) -> Config {
        self.inner.read().clone()
    }

    pub fn backend(&self) -> BackendConfig {
        self.inner.read().backend.clone()
    }

    /// Options for a query created now.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions::from(&self.inner.read().query)
    }

    /// Point the client at another host, bypassing the file.
    pub fn override_host(&self, host: impl Into<String>) -> Result<(), ConfigError> {
        let mut candidate = self.get();
        candidate.backend.host = host.into();
        candidate.validate()?;
        *self.inner.write() = candidate;
        Ok(())
    }

    /// Re-read the file. The current config survives a failed reload.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = Config::load_from(&self.path)?;
        *self.inner.write() = config;
        tracing::info!(path = %self.path.display(), "Configuration reloaded");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
