//! config
//!
//! Session settings and loading.
//!
//! # Locations
//!
//! Searched in order:
//! 1. The path passed to [`SessionConfig::load`]
//! 2. `$PERSISTED_CONFIG` if set
//! 3. Built-in defaults (100ms write interval, file store in the home directory)
//!
//! A location that does not exist falls through to the next one.
//!
//! # Example
//!
//! ```no_run
//! use persisted_config::config::SessionConfig;
//! use std::path::Path;
//!
//! let settings = SessionConfig::load(Some(Path::new("/etc/myapp/session.toml"))).unwrap();
//! println!("Write interval: {:?}", settings.write_interval());
//! println!("Store: {}", settings.store_provider());
//! ```

pub mod schema;

pub use schema::{SessionConfig, StoreSettings};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming a settings file.
pub const CONFIG_ENV_VAR: &str = "PERSISTED_CONFIG";

/// Errors from settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl SessionConfig {
    /// Load settings from `path`, then `$PERSISTED_CONFIG`, then defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read,
    /// parsed, or validated. Missing files are not an error.
    pub fn load(path: Option<&Path>) -> Result<SessionConfig, SettingsError> {
        let candidates = path
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        for candidate in candidates {
            if candidate.exists() {
                let config = Self::read_file(&candidate)?;
                config.validate()?;
                return Ok(config);
            }
        }

        Ok(SessionConfig::default())
    }

    /// Read and parse a settings file.
    fn read_file(path: &Path) -> Result<SessionConfig, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
