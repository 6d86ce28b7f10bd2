//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/YAML)
//!     → loader.rs (resolve path, wait readable, decode)
//!     → validation.rs (semantic checks)
//!     → store.rs (build index, publish Snapshot, notify callbacks)
//!     → shared via Arc<Snapshot> to every resolver
//!
//! On file change:
//!     watcher.rs detects change
//!     → store.rs reloads from the same path
//!     → atomic swap of Arc<Snapshot> (or keep the old one on error)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Free functions below drive a process-wide default store;
//!   tests and embedders can own independent `ConfigStore`s instead

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

use std::path::Path;
use std::sync::Arc;

pub use loader::{ConfigError, ConfigFormat};
pub use schema::{ApiKeyRecord, GatewayConfig, Limit, ProviderEntry, ProxyConf, ProxyStrategy};
pub use store::{ConfigStore, Settings, Snapshot};
pub use watcher::ConfigWatcher;

/// First-time load of the default store, then start watching the file.
///
/// Keep the returned watcher alive for as long as hot reload is wanted.
pub async fn init_config(path: impl AsRef<Path>) -> Result<ConfigWatcher, ConfigError> {
    let store = ConfigStore::global();
    store.load(path).await?;
    ConfigWatcher::start(Arc::clone(store), None)
}

/// Manually re-read the default store's file.
pub fn reload_config() -> Result<Arc<Snapshot>, ConfigError> {
    ConfigStore::global().reload()
}

/// Register a callback on the default store, run after every successful (re)load.
pub fn register_config_change_callback<F>(callback: F)
where
    F: Fn(&Snapshot) + Send + Sync + 'static,
{
    ConfigStore::global().register_change_callback(callback);
}
