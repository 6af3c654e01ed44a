//! live
//!
//! Live config sessions: hydration, validated writes, debounced persistence.
//!
//! # Architecture
//!
//! - [`LiveConfig`] - One hydrated session owning the live tree
//! - [`NodeHandle`] - Validated read/write access to one container
//! - [`Debouncer`] - Trailing-edge debounce of per-path store writes
//! - [`ConfigCell`] - Observable cell the session is handed out in
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use persisted_config::core::DefaultTree;
//! use persisted_config::live::get_config;
//! use persisted_config::store::{ConfigStore, MemoryStore};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let defaults = DefaultTree::from_json(json!({"ui": {"theme": "dark", "fontSize": 14}})).unwrap();
//! let store = MemoryStore::new();
//! let shared: Arc<dyn ConfigStore> = Arc::new(store.clone());
//!
//! let cell = get_config(defaults, shared, Duration::from_millis(100)).await.unwrap();
//! let config = cell.get();
//!
//! config.root().child("ui").unwrap().set("fontSize", 16).unwrap();
//! assert_eq!(config.get("ui.fontSize").unwrap().as_f64(), Some(16.0));
//!
//! tokio::time::sleep(Duration::from_millis(150)).await;
//! assert_eq!(store.record("ui.fontSize").as_deref(), Some("16"));
//! # }
//! ```

mod cell;
mod debounce;
mod node;
mod session;

pub use cell::ConfigCell;
pub use debounce::Debouncer;
pub use node::{NodeHandle, NodeId};
pub use session::LiveConfig;

use std::sync::Arc;
use std::time::Duration;

use crate::config::SessionConfig;
use crate::core::{ConfigError, DefaultTree};
use crate::store::{create_store, ConfigStore};

/// Debounce window used when none is configured.
pub const DEFAULT_WRITE_INTERVAL: Duration =
    Duration::from_millis(SessionConfig::DEFAULT_WRITE_INTERVAL_MS);

/// Hydrate `defaults` from `store` and hand the live config out in a cell.
///
/// Resolves only once the session is live.
///
/// # Errors
///
/// Any hydration error; see [`LiveConfig::open`].
pub async fn get_config(
    defaults: DefaultTree,
    store: Arc<dyn ConfigStore>,
    write_interval: Duration,
) -> Result<ConfigCell<LiveConfig>, ConfigError> {
    LiveConfig::open(defaults, store, write_interval)
        .await
        .map(ConfigCell::new)
}

/// [`get_config`] with the store and window taken from session settings.
pub async fn open_with_config(
    defaults: DefaultTree,
    settings: &SessionConfig,
) -> Result<ConfigCell<LiveConfig>, ConfigError> {
    settings.validate()?;
    let store: Arc<dyn ConfigStore> = Arc::from(create_store(settings)?);
    get_config(defaults, store, settings.write_interval()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Kind, Node};
    use crate::store::{FailOn, MemoryStore, StoreError};
    use serde_json::json;

    const WINDOW: Duration = Duration::from_millis(100);

    fn defaults() -> DefaultTree {
        DefaultTree::from_json(json!({
            "ui": {"theme": "dark", "fontSize": 14, "panes": [{"width": 200}, {"width": 300}]},
            "telemetry": false
        }))
        .unwrap()
    }

    async fn open(store: &MemoryStore) -> LiveConfig {
        let shared: Arc<dyn ConfigStore> = Arc::new(store.clone());
        let config = LiveConfig::open(defaults(), shared, WINDOW).await.unwrap();
        store.clear_operations();
        config
    }

    async fn settle() {
        tokio::time::sleep(WINDOW * 2).await;
    }

    mod writes {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn leaf_write_is_immediate_and_persisted_once() {
            let store = MemoryStore::new();
            let config = open(&store).await;
            let ui = config.root().child("ui").unwrap();

            ui.set("fontSize", 15).unwrap();
            ui.set("fontSize", 16).unwrap();

            assert_eq!(config.get("ui.fontSize").unwrap(), Node::from(16));
            assert!(store.writes().is_empty());
            assert_eq!(config.pending_writes(), 1);

            settle().await;

            assert_eq!(store.writes_to("ui.fontSize"), vec!["16"]);
            assert_eq!(config.pending_writes(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn type_mismatch_leaves_value_unchanged() {
            let store = MemoryStore::new();
            let config = open(&store).await;

            let result = config.set("ui.fontSize", "16");

            match result {
                Err(ConfigError::TypeMismatch { path, expected, found }) => {
                    assert_eq!(path, "ui.fontSize");
                    assert_eq!(expected, Kind::Number);
                    assert_eq!(found, Kind::String);
                }
                other => panic!("unexpected {:?}", other),
            }
            assert_eq!(config.get("ui.fontSize").unwrap(), Node::from(14));

            settle().await;
            assert!(store.writes().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn unknown_member_rejected() {
            let store = MemoryStore::new();
            let config = open(&store).await;

            assert!(matches!(
                config.root().set("colour", "red"),
                Err(ConfigError::UnknownMember { .. })
            ));
            assert!(matches!(
                config.set("ui.colour", "red"),
                Err(ConfigError::UnknownMember { .. })
            ));
            assert!(matches!(
                config.set("ui.panes.2", 1),
                Err(ConfigError::UnknownMember { .. })
            ));
        }

        #[tokio::test(start_paused = true)]
        async fn container_write_merges_entries() {
            let store = MemoryStore::new();
            let config = open(&store).await;
            let ui_before = config.root().child("ui").unwrap();

            let patch = Node::from_json(json!({"theme": "light"})).unwrap();
            config.root().set("ui", patch).unwrap();

            assert_eq!(config.get("ui.theme").unwrap(), Node::from("light"));
            assert_eq!(config.get("ui.fontSize").unwrap(), Node::from(14));
            assert_eq!(ui_before.get("theme").unwrap(), Node::from("light"));

            settle().await;
            assert_eq!(
                store.writes(),
                vec![("ui.theme".to_string(), "light".to_string())]
            );
        }

        #[tokio::test(start_paused = true)]
        async fn invalid_merge_changes_nothing() {
            let store = MemoryStore::new();
            let config = open(&store).await;

            let patch = Node::from_json(json!({"theme": "light", "fontSize": "huge"})).unwrap();
            assert!(config.root().set("ui", patch).is_err());

            assert_eq!(config.get("ui.theme").unwrap(), Node::from("dark"));
            assert_eq!(config.revision(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn array_members_by_index() {
            let store = MemoryStore::new();
            let config = open(&store).await;

            let pane = config.node("ui.panes.1").unwrap();
            assert_eq!(pane.prefix(), "ui.panes.1");
            pane.set("width", 320).unwrap();

            let panes = config.root().child("ui").unwrap().child("panes").unwrap();
            let patch = Node::from_json(json!([{"width": 180}])).unwrap();
            config.node("ui").unwrap().set("panes", patch).unwrap();

            assert_eq!(
                panes.snapshot().unwrap(),
                Node::from_json(json!([{"width": 180}, {"width": 320}])).unwrap()
            );

            settle().await;
            assert_eq!(store.writes_to("ui.panes.1.width"), vec!["320"]);
            assert_eq!(store.writes_to("ui.panes.0.width"), vec!["180"]);
        }

        #[tokio::test(start_paused = true)]
        async fn separate_paths_debounce_independently() {
            let store = MemoryStore::new();
            let config = open(&store).await;

            config.set("telemetry", true).unwrap();
            config.set("ui.theme", "light").unwrap();
            assert_eq!(config.pending_writes(), 2);

            settle().await;
            assert_eq!(store.writes_to("telemetry"), vec!["true"]);
            assert_eq!(store.writes_to("ui.theme"), vec!["light"]);
        }

        #[tokio::test(start_paused = true)]
        async fn failed_persist_keeps_memory_value() {
            let store = MemoryStore::new();
            let config = open(&store).await;
            let failing = store
                .clone()
                .fail_on(FailOn::Write(StoreError::WriteError("offline".into())));

            config.set("telemetry", true).unwrap();
            settle().await;

            assert_eq!(config.get("telemetry").unwrap(), Node::from(true));
            assert_eq!(failing.record("telemetry").as_deref(), Some("false"));
        }
    }

    mod handles {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn child_of_leaf_is_not_found() {
            let config = open(&MemoryStore::new()).await;
            let ui = config.root().child("ui").unwrap();

            assert!(matches!(ui.child("theme"), Err(ConfigError::PathNotFound(_))));
            assert!(matches!(ui.child("nope"), Err(ConfigError::UnknownMember { .. })));
        }

        #[tokio::test(start_paused = true)]
        async fn members_in_order() {
            let config = open(&MemoryStore::new()).await;
            assert_eq!(config.root().members().unwrap(), vec!["ui", "telemetry"]);
            assert_eq!(config.node("ui.panes").unwrap().members().unwrap(), vec!["0", "1"]);
        }

        #[tokio::test(start_paused = true)]
        async fn empty_containers_have_handles() {
            let defaults = DefaultTree::from_json(json!({"plugins": {}, "tabs": [[], 1]})).unwrap();
            let shared: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
            let config = LiveConfig::open(defaults, shared, WINDOW).await.unwrap();

            let plugins = config.node("plugins").unwrap();
            assert!(plugins.members().unwrap().is_empty());
            assert!(matches!(
                plugins.set("vim", true),
                Err(ConfigError::UnknownMember { .. })
            ));
            assert_eq!(config.node("tabs.0").unwrap().prefix(), "tabs.0");
            assert_eq!(config.get("tabs.1").unwrap(), Node::from(1));
        }

        #[tokio::test(start_paused = true)]
        async fn malformed_paths() {
            let config = open(&MemoryStore::new()).await;
            assert!(matches!(config.get("ui..theme"), Err(ConfigError::MalformedPath(_))));
            assert!(matches!(config.set("", 1), Err(ConfigError::MalformedPath(_))));
            assert!(matches!(config.node("ui."), Err(ConfigError::MalformedPath(_))));
        }

        #[tokio::test(start_paused = true)]
        async fn get_of_missing_path() {
            let config = open(&MemoryStore::new()).await;
            assert!(matches!(config.get("ui.nope"), Err(ConfigError::PathNotFound(_))));
            assert!(matches!(
                config.get("ui.theme.x"),
                Err(ConfigError::PathNotFound(_))
            ));
        }
    }

    mod observers {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn revision_bumps_per_write() {
            let config = open(&MemoryStore::new()).await;
            let mut changes = config.subscribe_changes();

            config.set("telemetry", true).unwrap();

            changes.changed().await.unwrap();
            assert_eq!(*changes.borrow_and_update(), 1);
            assert_eq!(config.revision(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn cell_value_keeps_identity_across_writes() {
            let store = MemoryStore::new();
            let shared: Arc<dyn ConfigStore> = Arc::new(store.clone());
            let cell = get_config(defaults(), shared, WINDOW).await.unwrap();
            let before = cell.get();

            before.set("ui.theme", "light").unwrap();

            let after = cell.get();
            assert!(before.ptr_eq(&after));
            assert_eq!(after.get("ui.theme").unwrap(), Node::from("light"));
        }
    }

    mod open {
        use super::*;
        use crate::config::StoreSettings;

        #[tokio::test]
        async fn hydration_failure_fails_open() {
            let store = MemoryStore::new().fail_on(FailOn::Read(StoreError::ReadError("down".into())));
            let shared: Arc<dyn ConfigStore> = Arc::new(store);

            let result = get_config(defaults(), shared, WINDOW).await;
            assert!(matches!(result, Err(ConfigError::Store(_))));
        }

        #[tokio::test]
        async fn open_with_memory_settings() {
            let settings = SessionConfig {
                write_interval_ms: Some(250),
                store: Some(StoreSettings {
                    provider: Some("memory".into()),
                    path: None,
                }),
            };

            let cell = open_with_config(defaults(), &settings).await.unwrap();
            let config = cell.get();

            assert_eq!(config.write_interval(), Duration::from_millis(250));
            assert_eq!(config.snapshot(), config.defaults().root().clone());
        }

        #[tokio::test]
        async fn open_with_invalid_settings() {
            let settings = SessionConfig {
                write_interval_ms: Some(0),
                ..Default::default()
            };
            assert!(matches!(
                open_with_config(defaults(), &settings).await,
                Err(ConfigError::Settings(_))
            ));
        }

        #[test]
        fn default_interval() {
            assert_eq!(DEFAULT_WRITE_INTERVAL, Duration::from_millis(100));
        }
    }
}
