//! Configuration store.
//!
//! # Responsibilities
//! - Hold the current [`Snapshot`] (raw config + index + tables + settings)
//! - Load, reload, and publish snapshots atomically
//! - Fan out change notifications to registered callbacks
//!
//! # Design Decisions
//! - Snapshots are immutable; publishing is a single `ArcSwap` store
//! - Readers never take a lock; writers are serialized by a mutex
//! - A failed reload leaves the live snapshot untouched
//! - Callbacks run after publish, sequentially, in registration order,
//!   with no lock held so they may call back into the store

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwapOption;

use crate::config::loader::{
    load_config, resolve_config_path, wait_for_file_readable, ConfigError, ConfigFormat,
    READABLE_MAX_WAIT,
};
use crate::config::schema::{ApiKeyRecord, GatewayConfig, ProxyConf, Translation};
use crate::load_balancer::{IndexSelector, StrategySelector};
use crate::observability::metrics;
use crate::routing::defaults::{
    BUILTIN_MULTI_CONTENT_MODELS, DEFAULT_LOAD_BALANCING, DEFAULT_SERVER_PORT,
};
use crate::routing::index::{build_index, ModelIndex};
use crate::routing::resolver::{ResolveError, Resolver};

/// Callback invoked with the newly published snapshot.
pub type ChangeCallback = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Scalar settings derived from the raw document.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub load_balancing: String,
    pub server_port: String,
    /// Default API key, if the document sets one.
    pub api_key: Option<String>,
    pub debug: bool,
    pub log_level: String,
    /// Built-in patterns followed by configured additions.
    pub multi_content_models: Vec<String>,
    pub proxy: ProxyConf,
    pub translation: Translation,
}

impl Settings {
    fn derive(config: &GatewayConfig) -> Self {
        let load_balancing = if config.load_balancing.is_empty() {
            DEFAULT_LOAD_BALANCING.to_string()
        } else {
            config.load_balancing.clone()
        };
        let server_port = if config.server_port.is_empty() {
            DEFAULT_SERVER_PORT.to_string()
        } else {
            config.server_port.clone()
        };
        let multi_content_models = BUILTIN_MULTI_CONTENT_MODELS
            .iter()
            .map(|m| m.to_string())
            .chain(config.multi_content_models.iter().cloned())
            .collect();

        Self {
            load_balancing,
            server_port,
            api_key: (!config.api_key.is_empty()).then(|| config.api_key.clone()),
            debug: config.debug,
            log_level: config.log_level.clone(),
            multi_content_models,
            proxy: config.proxy.clone(),
            translation: config.translation.clone(),
        }
    }
}

/// One consistent view of the configuration. Never mutated once published.
#[derive(Debug)]
pub struct Snapshot {
    /// Monotonic per store; starts at 1.
    pub version: u64,
    pub raw: Arc<GatewayConfig>,
    pub index: ModelIndex,
    pub supported_models: BTreeSet<String>,
    pub global_redirect: BTreeMap<String, String>,
    pub api_keys: HashMap<String, ApiKeyRecord>,
    pub settings: Settings,
}

impl Snapshot {
    /// Build a snapshot from a decoded document.
    pub fn build(version: u64, config: GatewayConfig) -> Self {
        let (index, supported_models) = build_index(&config);
        let api_keys = config
            .api_keys
            .iter()
            .map(|record| (record.api_key.clone(), record.clone()))
            .collect();

        Self {
            version,
            index,
            supported_models,
            global_redirect: config.model_redirect.clone(),
            api_keys,
            settings: Settings::derive(&config),
            raw: Arc::new(config),
        }
    }

    /// Supported model names for display, sorted.
    pub fn supported_models(&self) -> Vec<&str> {
        self.supported_models.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone)]
struct ConfigSource {
    path: PathBuf,
    format: ConfigFormat,
}

/// Holder of the current configuration snapshot.
pub struct ConfigStore {
    current: ArcSwapOption<Snapshot>,
    source: Mutex<Option<ConfigSource>>,
    callbacks: Mutex<Vec<ChangeCallback>>,
    /// Serializes writers (load/reload/apply).
    write_lock: Mutex<()>,
    next_version: AtomicU64,
    selector: Arc<dyn IndexSelector>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("version", &self.snapshot().map(|s| s.version))
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create an empty store using the default strategy selector.
    pub fn new() -> Self {
        Self::with_selector(Arc::new(StrategySelector::new()))
    }

    /// Create an empty store with a custom load-balancing selector.
    pub fn with_selector(selector: Arc<dyn IndexSelector>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            source: Mutex::new(None),
            callbacks: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
            next_version: AtomicU64::new(1),
            selector,
        }
    }

    /// Process-wide default store backing the free-function entry points.
    pub fn global() -> &'static Arc<ConfigStore> {
        static GLOBAL: OnceLock<Arc<ConfigStore>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ConfigStore::new()))
    }

    /// Resolve `path`, wait for it to be readable, then decode and publish it.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Snapshot>, ConfigError> {
        self.load_with_wait(path.as_ref(), READABLE_MAX_WAIT).await
    }

    /// [`ConfigStore::load`] with an explicit readability ceiling.
    pub async fn load_with_wait(
        &self,
        path: &Path,
        max_wait: std::time::Duration,
    ) -> Result<Arc<Snapshot>, ConfigError> {
        let path = resolve_config_path(path)?;
        tracing::info!(path = %path.display(), "Loading configuration");

        wait_for_file_readable(&path, max_wait).await?;
        let source = ConfigSource {
            format: ConfigFormat::from_path(&path)?,
            path,
        };

        let snapshot = self.load_source(&source)?;
        *lock(&self.source) = Some(source);
        Ok(snapshot)
    }

    /// Re-read the previously loaded file and publish it.
    ///
    /// On failure the live snapshot is left untouched.
    pub fn reload(&self) -> Result<Arc<Snapshot>, ConfigError> {
        let source = lock(&self.source).clone().ok_or(ConfigError::NotInitialized)?;
        tracing::info!(path = %source.path.display(), "Reloading configuration");

        self.load_source(&source).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to reload config. Keeping current configuration.");
        })
    }

    /// Publish an in-memory document, bypassing the filesystem.
    pub fn apply(&self, config: GatewayConfig) -> Arc<Snapshot> {
        let published = {
            let _guard = lock(&self.write_lock);
            self.publish(config)
        };
        notify(published)
    }

    fn load_source(&self, source: &ConfigSource) -> Result<Arc<Snapshot>, ConfigError> {
        let published = {
            let _guard = lock(&self.write_lock);
            match load_config(&source.path, source.format) {
                Ok(config) => {
                    metrics::record_reload(true);
                    self.publish(config)
                }
                Err(e) => {
                    metrics::record_reload(false);
                    return Err(e);
                }
            }
        };
        Ok(notify(published))
    }

    /// Build and swap in a new snapshot. Caller holds `write_lock`.
    ///
    /// Returns the snapshot with the callbacks registered at publish time; the
    /// caller runs them via [`notify`] after releasing the lock.
    fn publish(&self, config: GatewayConfig) -> (Arc<Snapshot>, Vec<ChangeCallback>) {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let snapshot = Arc::new(Snapshot::build(version, config));
        self.current.store(Some(Arc::clone(&snapshot)));

        tracing::info!(
            version,
            models = snapshot.index.len(),
            load_balancing = %snapshot.settings.load_balancing,
            server_port = %snapshot.settings.server_port,
            proxy_strategy = %snapshot.settings.proxy.strategy,
            "Configuration applied"
        );
        tracing::debug!(
            supported_models = ?snapshot.supported_models(),
            global_redirect = ?snapshot.global_redirect,
            multi_content_models = ?snapshot.settings.multi_content_models,
            "Configuration details"
        );
        metrics::set_model_count(snapshot.index.len());

        let callbacks = lock(&self.callbacks).clone();
        (snapshot, callbacks)
    }

    /// Register a callback run after every successful (re)load.
    pub fn register_change_callback<F>(&self, callback: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        lock(&self.callbacks).push(Arc::new(callback));
    }

    /// The current snapshot, if any configuration has been published.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// A resolver pinned to the current snapshot.
    pub fn resolver(&self) -> Result<Resolver, ResolveError> {
        let snapshot = self.snapshot().ok_or(ResolveError::StoreNotInitialized)?;
        Ok(Resolver::new(snapshot, Arc::clone(&self.selector)))
    }

    /// Path of the loaded file, if loaded from disk.
    pub fn source_path(&self) -> Option<PathBuf> {
        lock(&self.source).as_ref().map(|s| s.path.clone())
    }
}

fn notify((snapshot, callbacks): (Arc<Snapshot>, Vec<ChangeCallback>)) -> Arc<Snapshot> {
    for callback in &callbacks {
        callback(&snapshot);
    }
    snapshot
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
