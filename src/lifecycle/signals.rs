//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown
//! - A failed SIGHUP reload keeps the current config

use std::sync::Arc;

use crate::config::ConfigStore;
use crate::lifecycle::Shutdown;

/// Listen for signals until shutdown is triggered.
#[cfg(unix)]
pub async fn listen(store: Arc<ConfigStore>, shutdown: Arc<Shutdown>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut stop = shutdown.subscribe();

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading configuration");
                let store = Arc::clone(&store);
                // failures are logged by reload(); the old snapshot stays live
                let _ = tokio::task::spawn_blocking(move || store.reload()).await;
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received");
                shutdown.trigger();
            }
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("SIGINT received");
                shutdown.trigger();
            }
            _ = stop.recv() => return Ok(()),
        }
    }
}

/// Listen for Ctrl+C until shutdown is triggered.
#[cfg(not(unix))]
pub async fn listen(_store: Arc<ConfigStore>, shutdown: Arc<Shutdown>) -> std::io::Result<()> {
    let mut stop = shutdown.subscribe();
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("Ctrl+C received");
            shutdown.trigger();
        }
        _ = stop.recv() => {}
    }
    Ok(())
}
