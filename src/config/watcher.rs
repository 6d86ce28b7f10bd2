//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::loader::ConfigError;
use crate::config::store::ConfigStore;

/// Quiet period after a change event before reloading; editors emit bursts.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches the store's source file and reloads the store when it changes.
///
/// Dropping the watcher stops file notifications; the reload task exits once the
/// notification channel closes or shutdown is signalled.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Start watching the file the store was loaded from.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        store: Arc<ConfigStore>,
        shutdown: Option<broadcast::Receiver<()>>,
    ) -> Result<Self, ConfigError> {
        let path = store.source_path().ok_or(ConfigError::NotInitialized)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let file_name = path.file_name().map(|n| n.to_os_string());
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        tracing::debug!(paths = ?event.paths, "Config file change detected");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Watch the directory so atomic-rename saves are seen too.
        let watch_dir = path.parent().unwrap_or(Path::new("."));
        watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Config watcher started");

        let task = tokio::spawn(reload_loop(store, rx, shutdown));

        Ok(Self {
            path,
            _watcher: watcher,
            task,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop watching and end the reload task.
    pub async fn stop(self) {
        let ConfigWatcher { path, _watcher, task } = self;
        drop(_watcher);
        task.abort();
        let _ = task.await;
        tracing::info!(path = %path.display(), "Config watcher stopped");
    }
}

async fn reload_loop(
    store: Arc<ConfigStore>,
    mut changes: mpsc::UnboundedReceiver<()>,
    mut shutdown: Option<broadcast::Receiver<()>>,
) {
    loop {
        let changed = match shutdown.as_mut() {
            Some(rx) => tokio::select! {
                changed = changes.recv() => changed,
                _ = rx.recv() => {
                    tracing::info!("Config watcher received shutdown signal");
                    None
                }
            },
            None => changes.recv().await,
        };
        if changed.is_none() {
            break;
        }

        tokio::time::sleep(DEBOUNCE).await;
        while changes.try_recv().is_ok() {}

        tracing::info!("Config file change detected, reloading...");
        let store = Arc::clone(&store);
        match tokio::task::spawn_blocking(move || store.reload()).await {
            Ok(Ok(snapshot)) => {
                tracing::info!(version = snapshot.version, "Configuration reloaded successfully");
            }
            // reload() already logged the failure; the previous snapshot stays live
            Ok(Err(_)) => {}
            Err(e) => tracing::error!(error = %e, "Config reload task panicked"),
        }
    }
}
