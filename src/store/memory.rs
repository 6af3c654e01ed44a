//! store::memory
//!
//! In-memory store with operation recording and failure injection.
//!
//! # Design
//!
//! Records live in a `HashMap` behind `Arc<Mutex<...>>`, so clones share
//! state: hand one clone to a config session and keep another to inspect
//! what was read and written.
//!
//! # Example
//!
//! ```
//! use persisted_config::store::{ConfigStore, MemoryStore, StoreOperation};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::with_records([("ui.theme", "light")]);
//! let observer = store.clone();
//!
//! assert_eq!(store.read("ui.theme").await.unwrap().as_deref(), Some("light"));
//! store.write("ui.fontSize", "16").await.unwrap();
//!
//! assert_eq!(observer.record("ui.fontSize").as_deref(), Some("16"));
//! assert_eq!(observer.writes(), vec![("ui.fontSize".to_string(), "16".to_string())]);
//! assert!(matches!(observer.operations()[0], StoreOperation::Read { .. }));
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::traits::{ConfigStore, StoreError};

/// In-memory store.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    records: HashMap<String, String>,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    operations: Vec<StoreOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every read with the given error.
    Read(StoreError),
    /// Fail every write with the given error.
    Write(StoreError),
    /// Fail reads of one key only.
    ReadKey(String, StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Read { key: String },
    Write { key: String, value: String },
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with pre-existing records.
    pub fn with_records<K, V>(records: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.lock().records = records
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        store
    }

    /// Configure the store to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// The value currently stored under `key`.
    pub fn record(&self, key: &str) -> Option<String> {
        self.lock().records.get(key).cloned()
    }

    /// Snapshot of every stored record.
    pub fn records(&self) -> HashMap<String, String> {
        self.lock().records.clone()
    }

    /// Every operation in the order it was issued.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    /// Every write as `(key, value)`, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                StoreOperation::Write { key, value } => Some((key.clone(), value.clone())),
                StoreOperation::Read { .. } => None,
            })
            .collect()
    }

    /// Writes to a single key, in order.
    pub fn writes_to(&self, key: &str) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    /// Forget recorded operations, keeping records.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOperation::Read {
            key: key.to_string(),
        });

        match &inner.fail_on {
            Some(FailOn::Read(err)) => return Err(err.clone()),
            Some(FailOn::ReadKey(failing, err)) if failing == key => return Err(err.clone()),
            _ => {}
        }

        Ok(inner.records.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOperation::Write {
            key: key.to_string(),
            value: value.to_string(),
        });

        if let Some(FailOn::Write(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        inner.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
