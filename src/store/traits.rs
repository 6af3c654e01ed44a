//! store::traits
//!
//! Key-value store trait definition.
//!
//! # Design
//!
//! The store only knows strings. Keys are dot paths like `ui.fontSize`,
//! stored as-is without interpretation. Both operations are async since a
//! store may sit on disk or behind a network API.
//!
//! The config layer asks for nothing beyond "a later read of a key
//! eventually reflects the last completed write". No ordering, batching,
//! or durability guarantees are required.
//!
//! # Example
//!
//! ```
//! use persisted_config::store::{ConfigStore, MemoryStore, StoreError};
//!
//! async fn theme(store: &dyn ConfigStore) -> Result<String, StoreError> {
//!     Ok(store.read("ui.theme").await?.unwrap_or_else(|| "dark".into()))
//! }
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! store.write("ui.theme", "light").await.unwrap();
//! assert_eq!(theme(&store).await.unwrap(), "light");
//! # });
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to read from the store.
    #[error("failed to read from store: {0}")]
    ReadError(String),

    /// Failed to write to the store.
    #[error("failed to write to store: {0}")]
    WriteError(String),

    /// Provider not available or not configured.
    #[error("store provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for string key-value stores backing a config session.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, overwriting any existing value.
    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
