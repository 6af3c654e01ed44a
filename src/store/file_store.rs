//! store::file_store
//!
//! File-based store.
//!
//! - Records are stored in `~/.persisted-config/store.toml` by default
//! - The file is a flat TOML table of string keys to string values
//! - All writes are atomic (write to temp file, then rename)
//!
//! # Example
//!
//! ```no_run
//! use persisted_config::store::{ConfigStore, FileStore};
//!
//! # tokio_test::block_on(async {
//! let store = FileStore::new().unwrap();
//! store.write("ui.theme", "light").await.unwrap();
//! assert_eq!(store.read("ui.theme").await.unwrap().as_deref(), Some("light"));
//! # });
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::traits::{ConfigStore, StoreError};

/// File-based store.
///
/// Each write rewrites the whole file, so it suits config-sized data.
/// File I/O is blocking and runs on tokio's blocking pool, never on a
/// runtime worker. Writes from one process are serialized; concurrent
/// writers in other processes are not coordinated.
#[derive(Debug)]
pub struct FileStore {
    /// Path to the store file
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Create a file store at the default location.
    ///
    /// The default location is `~/.persisted-config/store.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, StoreError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StoreError::ProviderNotAvailable("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".persisted-config").join("store.toml")))
    }

    /// Create a file store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read all records from the file.
fn read_records(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| StoreError::ReadError(format!("cannot read store file: {}", e)))?;

    toml::from_str(&content)
        .map_err(|e| StoreError::ReadError(format!("cannot parse store file: {}", e)))
}

/// Write records to the file atomically.
fn write_records(path: &Path, records: &BTreeMap<String, String>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| StoreError::WriteError(format!("cannot create directory: {}", e)))?;
    }

    let content = toml::to_string_pretty(records)
        .map_err(|e| StoreError::WriteError(format!("cannot serialize records: {}", e)))?;

    let temp_path = path.with_extension("toml.tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| StoreError::WriteError(format!("cannot create temp file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| StoreError::WriteError(format!("cannot write records: {}", e)))?;

        file.sync_all()
            .map_err(|e| StoreError::WriteError(format!("cannot sync to disk: {}", e)))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| StoreError::WriteError(format!("cannot rename temp file: {}", e)))?;

    Ok(())
}

/// Run blocking file work on the blocking pool.
async fn run_blocking<T, F>(
    on_join_error: fn(String) -> StoreError,
    work: F,
) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| on_join_error(format!("store task failed: {}", e)))?
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path.clone();
        let key = key.to_string();
        run_blocking(StoreError::ReadError, move || {
            Ok(read_records(&path)?.remove(&key))
        })
        .await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path.clone();
        let lock = Arc::clone(&self.write_lock);
        let (key, value) = (key.to_string(), value.to_string());
        run_blocking(StoreError::WriteError, move || {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut records = read_records(&path)?;
            records.insert(key, value);
            write_records(&path, &records)
        })
        .await
    }
}
