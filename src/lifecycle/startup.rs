//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Start the config watcher
//! - Wire signal handling to reload and shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Watcher starts only after the first snapshot is published

use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigError, ConfigStore, ConfigWatcher, Snapshot};
use crate::lifecycle::{signals, Shutdown};

/// A running configuration core.
pub struct Gateway {
    pub store: Arc<ConfigStore>,
    pub shutdown: Arc<Shutdown>,
    watcher: ConfigWatcher,
}

impl Gateway {
    /// Load `path` into `store`, start hot reload and signal handling.
    pub async fn start(store: Arc<ConfigStore>, path: &Path) -> Result<Self, ConfigError> {
        let snapshot = store.load(path).await?;
        log_summary(&snapshot);

        let shutdown = Arc::new(Shutdown::new());
        let watcher = ConfigWatcher::start(Arc::clone(&store), Some(shutdown.subscribe()))?;

        let signal_store = Arc::clone(&store);
        let signal_shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(e) = signals::listen(signal_store, signal_shutdown).await {
                tracing::error!(error = %e, "Signal handler failed");
            }
        });

        Ok(Self {
            store,
            shutdown,
            watcher,
        })
    }

    /// Block until shutdown is triggered, then stop the watcher.
    pub async fn run_until_shutdown(self) {
        self.shutdown.wait().await;
        self.watcher.stop().await;
        tracing::info!("Shutdown complete");
    }
}

fn log_summary(snapshot: &Snapshot) {
    tracing::info!(
        version = snapshot.version,
        models = snapshot.index.len(),
        api_keys = snapshot.api_keys.len(),
        server_port = %snapshot.settings.server_port,
        "Configuration loaded"
    );
}
