//! Loading and hot-reload tests against real files.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use model_gateway::config::{ConfigError, ConfigWatcher};
use model_gateway::ConfigStore;
use tempfile::TempDir;

mod common;

#[tokio::test]
async fn test_load_json_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(
        dir.path(),
        "config.json",
        r#"{"services": {"svc-a": [{"models": ["m1"], "enabled": true, "timeout": 0}]}}"#,
    );

    let store = ConfigStore::new();
    let snapshot = store.load(&path).await.unwrap();

    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.settings.server_port, ":9090");
    assert_eq!(snapshot.settings.load_balancing, "random");
    let bindings = snapshot.index.get("m1").unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].entry.timeout, 60);
    assert_eq!(bindings[0].timeout(), Duration::from_secs(60));
    assert_eq!(store.source_path().unwrap(), path);
}

#[tokio::test]
async fn test_load_yaml() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(
        dir.path(),
        "config.yaml",
        r#"
server_port: ":8080"
load_balancing: round_robin
model_redirect:
  legacy: m2
services:
  svc-b:
    - provider: deepseek
      models: [m2]
      enabled: true
      provider_namespace: eu
"#,
    );

    let store = ConfigStore::new();
    let snapshot = store.load(&path).await.unwrap();

    assert_eq!(snapshot.settings.server_port, ":8080");
    assert_eq!(snapshot.global_redirect["legacy"], "m2");

    let resolver = store.resolver().unwrap();
    let model = resolver.apply_global_redirect("legacy");
    assert_eq!(resolver.resolve_model(model, "eu").unwrap().group, "svc-b");
    assert!(resolver.resolve_model(model, "").is_err());
}

#[tokio::test]
async fn test_unsupported_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "config.toml", "server_port = ':9090'");

    let store = ConfigStore::new();
    let err = store.load(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == ".toml"));
    assert!(err.to_string().contains("unsupported config type"));
    assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn test_missing_file_times_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let store = ConfigStore::new();
    let err = store
        .load_with_wait(&path, Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotReadable(_)));
    assert!(err.to_string().contains("timeout waiting for file to be readable"));
}

#[tokio::test]
async fn test_waits_for_file_to_appear() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("late.json");

    let writer_path = path.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        std::fs::write(&writer_path, common::single_model_json("g", "m1", None)).unwrap();
    });

    let store = ConfigStore::new();
    let snapshot = store.load_with_wait(&path, Duration::from_secs(5)).await.unwrap();
    writer.await.unwrap();
    assert!(snapshot.index.contains("m1"));
}

#[tokio::test]
async fn test_syntax_error_reports_position() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "broken.json", "{\n  \"services\": {,}\n}");

    let store = ConfigStore::new();
    match store.load(&path).await.unwrap_err() {
        ConfigError::Syntax { line, .. } => assert_eq!(line, 2),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "config.json", &common::single_model_json("g", "m1", None));

    let store = ConfigStore::new();
    store.load(&path).await.unwrap();

    std::fs::write(&path, "{ not json").unwrap();
    assert!(store.reload().is_err());

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.version, 1);
    assert!(snapshot.index.contains("m1"));
}

#[tokio::test]
async fn test_questionable_document_still_loads() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(
        dir.path(),
        "config.json",
        r#"{
            "api_keys": [
                {"api_key": "k", "supported_models": {"g": ["m0"]}},
                {"api_key": "k", "supported_models": {"g": ["m1"]}}
            ],
            "services": {
                "g": [{"models": ["m1"], "enabled": true, "server_url": "api.example.com/v1"}]
            }
        }"#,
    );

    let store = ConfigStore::new();
    store.load(&path).await.unwrap();

    let resolver = store.resolver().unwrap();
    assert_eq!(resolver.resolve_model("m1", "").unwrap().entry.server_url, "api.example.com/v1");
    // duplicate keys resolve to the last record
    assert!(resolver.authorize_key("k", "m1").is_ok());
    assert!(resolver.authorize_key("k", "m0").is_err());
}

#[tokio::test]
async fn test_manual_reload_picks_up_changes() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "config.json", &common::single_model_json("g", "m1", None));

    let store = ConfigStore::new();
    store.load(&path).await.unwrap();

    std::fs::write(&path, common::single_model_json("g", "m2", None)).unwrap();
    let snapshot = store.reload().unwrap();

    assert_eq!(snapshot.version, 2);
    assert!(snapshot.index.contains("m2"));
    assert!(!snapshot.index.contains("m1"));
}

#[tokio::test]
async fn test_callbacks_fire_on_load_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "config.json", &common::single_model_json("g", "m1", None));

    let store = ConfigStore::new();
    let last_seen = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&last_seen);
    store.register_change_callback(move |snapshot| {
        seen.store(snapshot.version, Ordering::SeqCst);
    });

    store.load(&path).await.unwrap();
    assert_eq!(last_seen.load(Ordering::SeqCst), 1);

    store.reload().unwrap();
    assert_eq!(last_seen.load(Ordering::SeqCst), 2);

    std::fs::write(&path, "{ broken").unwrap();
    assert!(store.reload().is_err());
    assert_eq!(last_seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_watcher_reloads_on_file_change() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "config.json", &common::single_model_json("g", "m1", None));

    let store = Arc::new(ConfigStore::new());
    store.load(&path).await.unwrap();
    let watcher = ConfigWatcher::start(Arc::clone(&store), None).unwrap();
    assert_eq!(watcher.path(), path.as_path());

    // Let the backend register the watch before editing.
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&path, common::single_model_json("g", "m2", None)).unwrap();

    assert!(common::wait_for_version(&store, 2, Duration::from_secs(5)).await);
    let resolver = store.resolver().unwrap();
    assert!(resolver.resolve_model("m2", "").is_ok());

    watcher.stop().await;
}

#[tokio::test]
async fn test_watcher_requires_loaded_store() {
    let store = Arc::new(ConfigStore::new());
    let err = ConfigWatcher::start(store, None).err().unwrap();
    assert!(matches!(err, ConfigError::NotInitialized));
}
