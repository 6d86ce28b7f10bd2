//! Shared utilities for integration tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use model_gateway::ConfigStore;

/// Write `contents` to `dir/name` and return the absolute path.
pub fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Minimal JSON document with one group serving `model`, optionally keyed.
#[allow(dead_code)]
pub fn single_model_json(group: &str, model: &str, api_key: Option<&str>) -> String {
    let api_keys = match api_key {
        Some(key) => format!(
            r#"[{{"api_key": "{key}", "supported_models": {{"{group}": ["{model}"]}}}}]"#
        ),
        None => "[]".to_string(),
    };
    format!(
        r#"{{
            "load_balancing": "first",
            "api_keys": {api_keys},
            "services": {{
                "{group}": [{{"provider": "openai", "models": ["{model}"], "enabled": true}}]
            }}
        }}"#
    )
}

/// Poll `store` until its version reaches `version` or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_for_version(store: &ConfigStore, version: u64, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if store.snapshot().is_some_and(|s| s.version >= version) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Poll `store` until `model` is routable or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_for_model(store: &ConfigStore, model: &str, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if store.snapshot().is_some_and(|s| s.index.contains(model)) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
