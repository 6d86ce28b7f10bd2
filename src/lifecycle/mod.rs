//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve path → Load config → Publish snapshot → Start watcher
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast to tasks → Watcher stops → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger config reload
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then watcher, then signal handling
//! - Initial load failure is fatal; later reload failures are not

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
