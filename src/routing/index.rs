//! Model resolution index.
//!
//! # Responsibilities
//! - Expand provider entries into concrete [`Binding`]s, one per served model
//! - Key bindings by externally visible model name (including redirect aliases)
//! - Produce the display set of supported model names
//!
//! # Design Decisions
//! - Built fresh from a [`GatewayConfig`] on every load; never patched in place
//! - Pure function: no I/O, the only side channel is debug logging
//! - Bindings are immutable and shared via `Arc`; a rebuild mints new IDs

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::schema::{GatewayConfig, ProviderEntry};
use crate::routing::defaults::{default_models, DEFAULT_TIMEOUT_SECS};

/// What a binding serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Chat,
    Embedding,
}

/// A concrete routing target: one provider entry serving one model name.
#[derive(Debug)]
pub struct Binding {
    /// Unique per build cycle.
    pub id: Uuid,
    /// Provider group the entry was declared under.
    pub group: String,
    /// Normalised copy of the originating entry (defaults applied).
    pub entry: Arc<ProviderEntry>,
    /// Namespace tag. Embedding bindings carry none.
    pub namespace: Option<String>,
    pub kind: BindingKind,
}

impl Binding {
    fn new(group: &str, entry: &Arc<ProviderEntry>, kind: BindingKind) -> Self {
        let namespace = match kind {
            BindingKind::Chat => Some(entry.provider_namespace.clone()),
            BindingKind::Embedding => None,
        };
        Self {
            id: Uuid::new_v4(),
            group: group.to_string(),
            entry: Arc::clone(entry),
            namespace,
            kind,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entry.enabled
    }

    /// True if the originating entry was declared under `namespace`.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.entry.provider_namespace == namespace
    }

    /// Effective request timeout. Always positive after index construction.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.entry.timeout.max(1) as u64)
    }

    /// Upstream model name for `model` according to the entry's rename table.
    pub fn apply_model_rename<'a>(&'a self, model: &'a str) -> &'a str {
        match self.entry.model_map.get(model) {
            Some(mapped) => {
                tracing::info!(model = %model, mapped_model = %mapped, "Model rename applied");
                mapped.as_str()
            }
            None => {
                tracing::debug!(model = %model, "No model rename found");
                model
            }
        }
    }

    /// Target model for `model` according to the entry's redirect table.
    pub fn apply_model_redirect<'a>(&'a self, model: &'a str) -> &'a str {
        match self.entry.model_redirect.get(model) {
            Some(target) => {
                tracing::info!(model = %model, redirect_model = %target, "Model redirect applied");
                target.as_str()
            }
            None => {
                tracing::debug!(model = %model, "No model redirect found");
                model
            }
        }
    }
}

/// Model name -> candidate bindings, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ModelIndex {
    models: HashMap<String, Vec<Arc<Binding>>>,
}

impl ModelIndex {
    pub fn get(&self, model: &str) -> Option<&[Arc<Binding>]> {
        self.models.get(model).map(Vec::as_slice)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Number of distinct model names.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// All model names, sorted lexicographically.
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Model names with their candidates, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<Binding>])> {
        self.models.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn push(&mut self, model: &str, binding: Arc<Binding>) {
        self.models.entry(model.to_string()).or_default().push(binding);
    }
}

/// Build the resolution index and the display set of supported model names.
///
/// In the display set a redirect key replaces its target, so a self-redirect
/// (`m → m`) hides `m`. Routing is unaffected: every name stays in the index.
pub fn build_index(config: &GatewayConfig) -> (ModelIndex, BTreeSet<String>) {
    let mut index = ModelIndex::default();
    let mut supported = BTreeSet::new();

    for (group, entries) in &config.services {
        for entry in entries.iter().filter(|e| e.enabled) {
            let entry = Arc::new(normalize_entry(group, entry));

            tracing::debug!(
                group = %group,
                models = ?entry.models,
                embedding_models = ?entry.embedding_models,
                timeout = entry.timeout,
                qps = entry.limit.qps,
                qpm = entry.limit.qpm,
                rpm = entry.limit.rpm,
                concurrency = entry.limit.concurrency,
                "Indexing provider entry"
            );

            for model in &entry.models {
                let binding = Arc::new(Binding::new(group, &entry, BindingKind::Chat));
                index.push(model, Arc::clone(&binding));
                supported.insert(model.clone());

                for (alias, target) in &entry.model_redirect {
                    index.push(alias, Arc::clone(&binding));
                    supported.insert(alias.clone());
                    supported.remove(target);
                }
            }

            for model in &entry.embedding_models {
                let binding = Arc::new(Binding::new(group, &entry, BindingKind::Embedding));
                index.push(model, Arc::clone(&binding));
                for alias in entry.model_redirect.keys() {
                    index.push(alias, Arc::clone(&binding));
                }
            }
        }
    }

    (index, supported)
}

/// Apply default model list and default timeout to an entry.
fn normalize_entry(group: &str, entry: &ProviderEntry) -> ProviderEntry {
    let mut entry = entry.clone();

    if entry.models.is_empty() {
        if let Some(defaults) = default_models(group, &entry.provider) {
            tracing::debug!(group = %group, models = ?defaults, "Using default model list");
            entry.models = defaults.iter().map(|m| m.to_string()).collect();
        }
    }

    if entry.timeout <= 0 {
        entry.timeout = DEFAULT_TIMEOUT_SECS;
    }

    entry
}
