//! Model gateway configuration and routing core.
//!
//! Turns a declarative gateway document (provider groups, models, credentials,
//! redirects, API keys) into an immutable routing snapshot, keeps it current as the
//! file changes, and answers "which backend serves this model?" per request.

pub mod config;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::{ConfigError, ConfigStore, GatewayConfig, Snapshot};
pub use routing::{Binding, ResolveError, Resolver};
