//! Request-time resolution pipeline.
//!
//! # Responsibilities
//! - Pick a binding for a model name within a namespace
//! - Apply the global redirect table
//! - Authorize API keys against their allowed models
//! - Decide proxy usage and multi-content capability
//!
//! # Design Decisions
//! - A [`Resolver`] pins one snapshot, so every step of a request sees the same config
//! - Never blocks and never panics on a miss; failures are typed
//! - Selection among candidates is delegated to an [`IndexSelector`]

use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::ModelParams;
use crate::config::store::Snapshot;
use crate::load_balancer::IndexSelector;
use crate::observability::metrics;
use crate::routing::defaults::{DEFAULT_LOAD_BALANCING, RANDOM_MODEL, WILDCARD};
use crate::routing::index::Binding;

/// Errors returned by the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("model {0} not found in the configuration")]
    ModelNotFound(String),

    #[error("no enabled binding for model {model} in namespace '{namespace}'")]
    NoEnabledBinding { model: String, namespace: String },

    #[error("no models configured")]
    NoModels,

    #[error("Forbidden: invalid API key")]
    InvalidApiKey,

    #[error("Forbidden: model not supported for this key")]
    ModelNotAuthorized { model: String },

    #[error("config store not initialized")]
    StoreNotInitialized,
}

/// Read-side API over one configuration snapshot.
#[derive(Debug, Clone)]
pub struct Resolver {
    snapshot: Arc<Snapshot>,
    selector: Arc<dyn IndexSelector>,
}

impl Resolver {
    pub fn new(snapshot: Arc<Snapshot>, selector: Arc<dyn IndexSelector>) -> Self {
        Self { snapshot, selector }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    fn strategy(&self) -> &str {
        &self.snapshot.settings.load_balancing
    }

    /// Select an enabled binding for `model` declared under `namespace`.
    pub fn resolve_model(&self, model: &str, namespace: &str) -> Result<Arc<Binding>, ResolveError> {
        let result = self.select_in_namespace(model, namespace);
        metrics::record_resolution(result.is_ok());
        result
    }

    fn select_in_namespace(&self, model: &str, namespace: &str) -> Result<Arc<Binding>, ResolveError> {
        let candidates = self.snapshot.index.get(model).ok_or_else(|| {
            tracing::debug!(model = %model, "Model not found");
            ResolveError::ModelNotFound(model.to_string())
        })?;

        let enabled: Vec<&Arc<Binding>> = candidates
            .iter()
            .filter(|b| b.is_enabled() && b.in_namespace(namespace))
            .collect();

        if enabled.is_empty() {
            tracing::debug!(model = %model, namespace = %namespace, "No enabled binding");
            return Err(ResolveError::NoEnabledBinding {
                model: model.to_string(),
                namespace: namespace.to_string(),
            });
        }

        let i = self.selector.select_index(self.strategy(), model, enabled.len());
        Ok(Arc::clone(enabled[i.min(enabled.len() - 1)]))
    }

    /// Pick any model (sorted-name order), then any of its bindings, ignoring namespaces.
    pub fn resolve_random_binding(&self) -> Result<Arc<Binding>, ResolveError> {
        let names = self.snapshot.index.model_names();
        if names.is_empty() {
            return Err(ResolveError::NoModels);
        }

        let i = self.selector.select_index(self.strategy(), RANDOM_MODEL, names.len());
        let model = names[i.min(names.len() - 1)];

        let candidates = self
            .snapshot
            .index
            .get(model)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ResolveError::ModelNotFound(model.to_string()))?;
        let j = self.selector.select_index(self.strategy(), model, candidates.len());

        tracing::debug!(model = %model, "Random binding selected");
        Ok(Arc::clone(&candidates[j.min(candidates.len() - 1)]))
    }

    /// Random binding plus a concrete model name that binding serves.
    pub fn resolve_random_model(&self) -> Result<(Arc<Binding>, String), ResolveError> {
        let binding = self.resolve_random_binding()?;
        let models = if binding.entry.models.is_empty() {
            &binding.entry.embedding_models
        } else {
            &binding.entry.models
        };
        if models.is_empty() {
            return Err(ResolveError::NoModels);
        }

        let i = self.selector.select_index(DEFAULT_LOAD_BALANCING, RANDOM_MODEL, models.len());
        let model = models[i.min(models.len() - 1)].clone();
        Ok((binding, model))
    }

    /// Apply the global redirect table.
    ///
    /// A `*` key overrides every model; a `*` value under it means "pick randomly".
    pub fn apply_global_redirect<'a>(&'a self, model: &'a str) -> &'a str {
        let table = &self.snapshot.global_redirect;

        if let Some(target) = table.get(WILDCARD) {
            let target = if target == WILDCARD { RANDOM_MODEL } else { target.as_str() };
            tracing::info!(model = %model, redirect_model = %target, "Global wildcard redirect applied");
            return target;
        }

        if let Some(target) = table.get(model) {
            tracing::info!(model = %model, redirect_model = %target, "Global redirect applied");
            return target;
        }

        tracing::debug!(model = %model, "No global redirect found");
        model
    }

    /// Check that `api_key` may use `model`. Open mode when no keys are configured.
    pub fn authorize_key(&self, api_key: &str, model: &str) -> Result<(), ResolveError> {
        let keys = &self.snapshot.api_keys;
        if keys.is_empty() {
            return Ok(());
        }

        let Some(record) = keys.get(api_key) else {
            tracing::warn!("Rejected request with invalid API key");
            return Err(ResolveError::InvalidApiKey);
        };

        let allowed = record
            .supported_models
            .values()
            .flatten()
            .any(|m| m == WILDCARD || m == model);

        if allowed {
            Ok(())
        } else {
            tracing::warn!(model = %model, "Model not supported for API key");
            Err(ResolveError::ModelNotAuthorized {
                model: model.to_string(),
            })
        }
    }

    pub fn should_use_proxy(&self, binding: &Binding) -> bool {
        self.snapshot
            .settings
            .proxy
            .strategy
            .should_proxy(binding.entry.use_proxy)
    }

    pub fn is_multi_content_capable(&self, model: &str) -> bool {
        self.snapshot
            .settings
            .multi_content_models
            .iter()
            .any(|pattern| pattern_matches(pattern, model))
    }

    /// Configured sampling parameter ranges for `model`.
    pub fn model_params(&self, model: &str) -> Option<&ModelParams> {
        self.snapshot.raw.params_range.get(model)
    }
}

/// Exact match, or prefix match when `pattern` ends with `*`.
pub fn pattern_matches(pattern: &str, model: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => model.starts_with(prefix),
        None => pattern == model,
    }
}
