//! store
//!
//! Key-value store abstraction backing a config session.
//!
//! # Architecture
//!
//! Records are read and written through the [`ConfigStore`] trait, which has
//! two implementations:
//!
//! - [`FileStore`]: Stores in `~/.persisted-config/store.toml` (default)
//! - [`MemoryStore`]: Process-local, with operation recording for tests
//!
//! # Provider Selection
//!
//! Use [`create_store`] to build a store from session settings:
//!
//! ```
//! use persisted_config::config::{SessionConfig, StoreSettings};
//! use persisted_config::store::create_store;
//!
//! let settings = SessionConfig {
//!     store: Some(StoreSettings { provider: Some("memory".into()), path: None }),
//!     ..Default::default()
//! };
//! let store = create_store(&settings).unwrap();
//! ```

mod file_store;
mod memory;
mod traits;

pub use file_store::FileStore;
pub use memory::{FailOn, MemoryStore, StoreOperation};
pub use traits::{ConfigStore, StoreError};

use crate::config::SessionConfig;

/// Create a store based on the configured provider.
///
/// # Providers
///
/// - `"file"` (default): [`FileStore`] at the configured path, or
///   `~/.persisted-config/store.toml`
/// - `"memory"`: an empty [`MemoryStore`]
///
/// # Errors
///
/// - Unknown provider name
/// - Home directory unavailable for the default file location
pub fn create_store(settings: &SessionConfig) -> Result<Box<dyn ConfigStore>, StoreError> {
    match settings.store_provider() {
        "file" => match settings.store_path() {
            Some(path) => Ok(Box::new(FileStore::with_path(path))),
            None => Ok(Box::new(FileStore::new()?)),
        },
        "memory" => Ok(Box::new(MemoryStore::new())),
        other => Err(StoreError::ProviderNotAvailable(format!(
            "unknown store provider: '{}' (valid: file, memory)",
            other
        ))),
    }
}
