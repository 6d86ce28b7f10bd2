//! Process-wide entry points over the default store.
//!
//! The default store is global, so everything lives in one test in its own binary.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use model_gateway::config::{init_config, register_config_change_callback, reload_config};
use model_gateway::ConfigStore;
use tempfile::TempDir;

mod common;

#[tokio::test]
async fn test_init_reload_and_watch_default_store() {
    let dir = TempDir::new().unwrap();
    let path = common::write_config(dir.path(), "config.json", &common::single_model_json("g", "m1", None));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    register_config_change_callback(move |snapshot| {
        recorder.lock().unwrap().push(snapshot.version);
    });

    let watcher = init_config(&path).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1]);
    assert!(ConfigStore::global().snapshot().unwrap().index.contains("m1"));

    std::fs::write(&path, common::single_model_json("g", "m2", None)).unwrap();
    let snapshot = reload_config().unwrap();
    assert!(snapshot.version >= 2);
    assert!(snapshot.index.contains("m2"));
    assert!(!snapshot.index.contains("m1"));

    // The watcher started by init_config picks up later edits on its own.
    let before = ConfigStore::global().snapshot().unwrap().version;
    tokio::time::sleep(Duration::from_millis(300)).await;
    std::fs::write(&path, common::single_model_json("g", "m3", None)).unwrap();
    assert!(common::wait_for_version(ConfigStore::global(), before + 1, Duration::from_secs(5)).await);
    assert!(common::wait_for_model(ConfigStore::global(), "m3", Duration::from_secs(5)).await);

    // reload_config runs callbacks before returning
    let versions = seen.lock().unwrap().clone();
    assert_eq!(versions[0], 1);
    assert!(versions.contains(&snapshot.version));

    watcher.stop().await;
}
