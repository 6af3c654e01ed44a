//! Persisted Config - Nested configuration persisted leaf by leaf
//!
//! A config is described by a tree of defaults. Each primitive leaf of the
//! tree is stored under its dot-joined path in a key-value store as a
//! string. Opening a config reads every leaf, seeds missing ones with their
//! defaults, and hands back a live tree whose writes are validated against
//! the defaults and persisted with a per-path debounce.
//!
//! # Architecture
//!
//! - [`core`] - Tree types, path codec, navigation, hydration
//! - [`live`] - Live sessions, node handles, debounced persistence
//! - [`store`] - Key-value store abstraction and providers
//! - [`config`] - Session settings loading
//!
//! # Correctness Invariants
//!
//! 1. The live tree always has the shape of the default tree
//! 2. Every leaf keeps the kind of its default
//! 3. A rejected write changes nothing
//! 4. Every accepted leaf write reaches the store once its window closes
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use persisted_config::{get_config, ConfigStore, DefaultTree, MemoryStore, DEFAULT_WRITE_INTERVAL};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let defaults = DefaultTree::from_json(json!({"ui": {"theme": "dark"}})).unwrap();
//! let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::with_records([("ui.theme", "light")]));
//!
//! let config = get_config(defaults, store, DEFAULT_WRITE_INTERVAL).await.unwrap().get();
//! assert_eq!(config.get("ui.theme").unwrap().as_str(), Some("light"));
//! # });
//! ```

pub mod config;
pub mod core;
pub mod live;
pub mod store;

pub use crate::config::SessionConfig;
pub use crate::core::{ConfigError, DefaultTree, DotPath, Kind, Node, Primitive};
pub use crate::live::{
    get_config, open_with_config, ConfigCell, LiveConfig, NodeHandle, DEFAULT_WRITE_INTERVAL,
};
pub use crate::store::{ConfigStore, FileStore, MemoryStore, StoreError};
