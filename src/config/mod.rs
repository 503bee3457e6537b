//! Configuration loading and storage.

mod loader;
mod store;
mod types;

pub use loader::{ConfigError, HOST_ENV_VAR};
pub use store::ConfigStore;
pub use types::{BackendConfig, Config, QueryConfig};
