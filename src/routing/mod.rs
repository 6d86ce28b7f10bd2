//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Index build (on every config load):
//!     GatewayConfig.services
//!     → defaults.rs (fill empty model lists, default timeout)
//!     → index.rs (one Binding per entry per model, aliases from redirects)
//!     → frozen ModelIndex inside the Snapshot
//!
//! Request time:
//!     (model, namespace, api key)
//!     → resolver.rs (global redirect, key check, namespace filter)
//!     → load_balancer (pick one candidate)
//!     → Binding or ResolveError
//! ```
//!
//! # Design Decisions
//! - Index is immutable at runtime; a reload builds a new one
//! - Deterministic candidate order for a given document
//! - Explicit typed misses rather than silent defaults

pub mod defaults;
pub mod index;
pub mod resolver;

pub use index::{build_index, Binding, BindingKind, ModelIndex};
pub use resolver::{ResolveError, Resolver};
