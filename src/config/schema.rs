//! Configuration schema definitions.
//!
//! This module defines the complete shape of the gateway configuration document.
//! All types derive Serde traits so the same structs decode from JSON and YAML.
//! Every struct carries `#[serde(default)]` so that minimal documents are accepted.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listen address, e.g. ":9090". Empty means the built-in default.
    pub server_port: String,

    /// Forces debug-level logging when set.
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Outbound proxy policy.
    pub proxy: ProxyConf,

    /// Default API key handed to clients that do not present their own.
    pub api_key: String,

    /// Load-balancing strategy name. Empty means "random".
    pub load_balancing: String,

    /// Additional multi-content model patterns (appended to the built-in list).
    pub multi_content_models: Vec<String>,

    /// Global model redirect table, applied before resolution.
    pub model_redirect: BTreeMap<String, String>,

    /// Per-model sampling parameter ranges.
    pub params_range: HashMap<String, ModelParams>,

    /// Provider group name -> configured provider entries.
    ///
    /// Ordered so that index discovery order is stable for a given document.
    pub services: BTreeMap<String, Vec<ProviderEntry>>,

    /// Translation feature settings.
    pub translation: Translation,

    /// Serve the management web UI.
    pub enable_web: bool,

    /// API keys and the models each key may use.
    pub api_keys: Vec<ApiKeyRecord>,
}

/// Advisory rate and concurrency caps. Enforcement lives outside this crate.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Limit {
    pub qps: f64,
    pub qpm: f64,
    pub rpm: f64,
    pub concurrency: f64,
    pub timeout: i64,
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// Allowed sampling parameters for one model.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelParams {
    pub temperature_range: Range,
    pub top_p_range: Range,
    pub max_tokens: i64,
}

/// One configured backend offering within a provider group.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProviderEntry {
    /// Provider kind (adapter name), e.g. "openai".
    pub provider: String,

    /// Embedding models served by this entry.
    pub embedding_models: Vec<String>,

    /// Limits applied to embedding calls.
    pub embedding_limit: Limit,

    /// Chat models served by this entry. Empty means the provider default list.
    pub models: Vec<String>,

    /// Reasoning-model alias table.
    pub reasoning_models: HashMap<String, String>,

    pub enabled: bool,

    /// Single credential set.
    pub credentials: HashMap<String, serde_json::Value>,

    /// Credential sets for rotation or sharding.
    pub credential_list: Vec<HashMap<String, serde_json::Value>>,

    pub server_url: String,

    /// Requested model name -> upstream model name.
    pub model_map: BTreeMap<String, String>,

    /// Alias -> model name. Aliases become routable names of their own.
    pub model_redirect: BTreeMap<String, String>,

    pub limit: Limit,

    /// Per-entry proxy override. `None` defers to the global strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_proxy: Option<bool>,

    /// Request timeout in seconds. Zero or negative means the system default.
    pub timeout: i64,

    /// Isolates same-named models served by distinct deployments.
    pub provider_namespace: String,
}

/// Global proxy strategy.
///
/// Decoded from a plain string; both `force_all` and `force-all` spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyStrategy {
    /// Proxy every entry, ignoring per-entry overrides.
    ForceAll,
    /// Proxy every entry unless it opts out.
    All,
    /// Proxy only entries that opt in.
    Default,
    /// Never proxy.
    Disabled,
    /// Anything else, including an unset strategy. Never proxies.
    Other(String),
}

impl ProxyStrategy {
    /// Decide whether a request should go through the proxy given a per-entry override.
    pub fn should_proxy(&self, use_proxy: Option<bool>) -> bool {
        match self {
            ProxyStrategy::ForceAll => true,
            ProxyStrategy::All => use_proxy != Some(false),
            ProxyStrategy::Default => use_proxy == Some(true),
            ProxyStrategy::Disabled => false,
            ProxyStrategy::Other(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProxyStrategy::ForceAll => "force_all",
            ProxyStrategy::All => "all",
            ProxyStrategy::Default => "default",
            ProxyStrategy::Disabled => "disabled",
            ProxyStrategy::Other(s) => s,
        }
    }
}

impl Default for ProxyStrategy {
    fn default() -> Self {
        ProxyStrategy::Other(String::new())
    }
}

impl From<String> for ProxyStrategy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "force_all" | "force-all" | "forceall" => ProxyStrategy::ForceAll,
            "all" => ProxyStrategy::All,
            "default" => ProxyStrategy::Default,
            "disabled" => ProxyStrategy::Disabled,
            _ => ProxyStrategy::Other(s),
        }
    }
}

impl From<ProxyStrategy> for String {
    fn from(s: ProxyStrategy) -> Self {
        match s {
            ProxyStrategy::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProxyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConf {
    pub strategy: ProxyStrategy,

    /// Proxy kind, e.g. "http" or "socks5".
    #[serde(rename = "type")]
    pub kind: String,

    pub http_proxy: String,
    pub https_proxy: String,
    pub socks5_proxy: String,
    pub timeout: i64,
}

/// Translation feature settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Translation {
    pub enable: bool,

    #[serde(alias = "promptTemplate")]
    pub prompt_template: String,

    pub retry: i64,
    pub concurrency: i64,
}

/// An API key and, per provider group, the model names it may use.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ApiKeyRecord {
    pub api_key: String,

    /// Provider group -> allowed model names. `*` allows every model.
    pub supported_models: BTreeMap<String, Vec<String>>,
}
