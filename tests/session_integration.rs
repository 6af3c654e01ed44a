//! Integration tests for config sessions.
//!
//! These tests open sessions through the public entry points against the
//! in-memory store and a real file store in a temp directory.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use persisted_config::config::{SessionConfig, StoreSettings};
use persisted_config::store::StoreOperation;
use persisted_config::{
    get_config, open_with_config, ConfigError, ConfigStore, DefaultTree, FileStore, MemoryStore,
    Node,
};

const WINDOW: Duration = Duration::from_millis(100);

// =============================================================================
// Test Helpers
// =============================================================================

fn editor_defaults() -> DefaultTree {
    DefaultTree::from_json(json!({
        "ui": {"theme": "dark", "fontSize": 14},
        "recent": ["a.txt", "b.txt"],
        "autosave": true
    }))
    .expect("valid defaults")
}

fn shared(store: &MemoryStore) -> Arc<dyn ConfigStore> {
    Arc::new(store.clone())
}

// =============================================================================
// Hydration
// =============================================================================

#[tokio::test(start_paused = true)]
async fn first_open_seeds_every_leaf() {
    let store = MemoryStore::new();

    let config = get_config(editor_defaults(), shared(&store), WINDOW)
        .await
        .unwrap()
        .get();

    assert_eq!(config.snapshot(), editor_defaults().root().clone());
    assert_eq!(store.record("ui.theme").as_deref(), Some("dark"));
    assert_eq!(store.record("ui.fontSize").as_deref(), Some("14"));
    assert_eq!(store.record("recent.1").as_deref(), Some("b.txt"));
    assert_eq!(store.record("autosave").as_deref(), Some("true"));
    assert_eq!(store.writes().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn stored_values_win_over_defaults() {
    let store = MemoryStore::with_records([
        ("ui.theme", "light"),
        ("ui.fontSize", "18"),
        ("autosave", "false"),
    ]);

    let config = get_config(editor_defaults(), shared(&store), WINDOW)
        .await
        .unwrap()
        .get();

    assert_eq!(config.get("ui.theme").unwrap(), Node::from("light"));
    assert_eq!(config.get("ui.fontSize").unwrap(), Node::from(18));
    assert_eq!(config.get("autosave").unwrap(), Node::from(false));

    let seeded: Vec<String> = store.writes().into_iter().map(|(key, _)| key).collect();
    assert_eq!(seeded, vec!["recent.0", "recent.1"]);
}

#[tokio::test(start_paused = true)]
async fn every_leaf_is_read_once() {
    let store = MemoryStore::new();
    get_config(editor_defaults(), shared(&store), WINDOW)
        .await
        .unwrap();

    let reads = store
        .operations()
        .into_iter()
        .filter(|op| matches!(op, StoreOperation::Read { .. }))
        .count();
    assert_eq!(reads, 5);
}

#[tokio::test(start_paused = true)]
async fn default_tree_must_be_container() {
    assert!(matches!(
        DefaultTree::from_json(json!("dark")),
        Err(ConfigError::InvalidDefault(_))
    ));
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn font_size_bumps_collapse_into_one_write() {
    let store = MemoryStore::new();
    let config = get_config(editor_defaults(), shared(&store), WINDOW)
        .await
        .unwrap()
        .get();
    store.clear_operations();

    let ui = config.root().child("ui").unwrap();
    ui.set("fontSize", 15).unwrap();
    ui.set("fontSize", 16).unwrap();
    assert_eq!(ui.get("fontSize").unwrap(), Node::from(16));

    tokio::time::sleep(WINDOW * 2).await;

    assert_eq!(
        store.writes(),
        vec![("ui.fontSize".to_string(), "16".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn writes_survive_a_reopen() {
    let store = MemoryStore::new();
    let first = get_config(editor_defaults(), shared(&store), WINDOW)
        .await
        .unwrap()
        .get();

    first.set("ui.theme", "solarized").unwrap();
    first.set("recent.0", "c.txt").unwrap();
    tokio::time::sleep(WINDOW * 2).await;

    let second = get_config(editor_defaults(), shared(&store), WINDOW)
        .await
        .unwrap()
        .get();

    assert!(!first.ptr_eq(&second));
    assert_eq!(second.snapshot(), first.snapshot());
}

// =============================================================================
// File Store
// =============================================================================

#[tokio::test]
async fn file_store_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.toml");
    let store: Arc<dyn ConfigStore> = Arc::new(FileStore::with_path(&path));

    let config = get_config(editor_defaults(), Arc::clone(&store), Duration::from_millis(10))
        .await
        .unwrap()
        .get();
    config.set("ui.fontSize", 20).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("ui.fontSize"));

    let reopened = get_config(editor_defaults(), store, Duration::from_millis(10))
        .await
        .unwrap()
        .get();
    assert_eq!(reopened.get("ui.fontSize").unwrap(), Node::from(20));
}

#[tokio::test]
async fn open_with_file_settings() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("store.toml");
    let settings = SessionConfig {
        write_interval_ms: Some(10),
        store: Some(StoreSettings {
            provider: Some("file".into()),
            path: Some(path.clone()),
        }),
    };

    let config = open_with_config(editor_defaults(), &settings)
        .await
        .unwrap()
        .get();

    assert_eq!(config.write_interval(), Duration::from_millis(10));
    assert!(path.exists());
}

#[tokio::test]
async fn open_with_unknown_provider_fails() {
    let settings = SessionConfig {
        store: Some(StoreSettings {
            provider: Some("registry".into()),
            path: None,
        }),
        ..Default::default()
    };

    assert!(open_with_config(editor_defaults(), &settings).await.is_err());
}
