//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Map the config's `debug` / `log_level` onto a filter directive
//! - Re-apply the level when the configuration is reloaded
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level and pins it
//! - Initialization is idempotent so tests and embedders can call it freely

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Handle for changing the log level after initialization.
#[derive(Clone, Debug)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    pinned: bool,
}

impl LogHandle {
    /// Switch to `level` unless `RUST_LOG` pinned the filter at startup.
    pub fn set_level(&self, level: &str) {
        if self.pinned {
            return;
        }
        match self.handle.reload(EnvFilter::new(filter_directive(level))) {
            Ok(()) => tracing::debug!(level = %level, "Log level updated"),
            Err(e) => tracing::warn!(error = %e, "Failed to update log level"),
        }
    }
}

/// Install the global subscriber. Returns `None` if one was already installed.
pub fn init_logging(level: &str) -> Option<LogHandle> {
    let from_env = EnvFilter::try_from_default_env();
    let pinned = from_env.is_ok();
    let filter = from_env.unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok()?;

    Some(LogHandle { handle, pinned })
}

/// Effective level from the config document's `debug` and `log_level` fields.
pub fn effective_level(debug: bool, log_level: &str) -> &str {
    if debug {
        "debug"
    } else if log_level.is_empty() {
        "info"
    } else {
        log_level
    }
}

fn filter_directive(level: &str) -> String {
    format!("model_gateway={level},warn")
}
