//! config::schema
//!
//! Session settings schema types.
//!
//! # Validation
//!
//! Settings are validated after parsing: the write interval must be
//! positive and the store provider must be one this crate ships.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::SettingsError;

/// Settings for one config session.
///
/// # Example
///
/// ```toml
/// write_interval_ms = 250
///
/// [store]
/// provider = "file"
/// path = "/var/lib/myapp/config-store.toml"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Debounce window for store writes, in milliseconds
    pub write_interval_ms: Option<u64>,

    /// Store selection
    pub store: Option<StoreSettings>,
}

impl SessionConfig {
    /// Default debounce window in milliseconds.
    pub const DEFAULT_WRITE_INTERVAL_MS: u64 = 100;

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.write_interval_ms == Some(0) {
            return Err(SettingsError::InvalidValue(
                "write_interval_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(store) = &self.store {
            store.validate()?;
        }

        Ok(())
    }

    /// The debounce window.
    ///
    /// Defaults to 100ms if not configured.
    pub fn write_interval(&self) -> Duration {
        Duration::from_millis(
            self.write_interval_ms
                .unwrap_or(Self::DEFAULT_WRITE_INTERVAL_MS),
        )
    }

    /// The store provider.
    ///
    /// Defaults to "file" if not configured.
    pub fn store_provider(&self) -> &str {
        self.store
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or(StoreSettings::DEFAULT_PROVIDER)
    }

    /// Custom store file path, if configured.
    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_ref().and_then(|s| s.path.as_deref())
    }
}

/// Store selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// Provider to use ("file" or "memory")
    pub provider: Option<String>,

    /// Store file location (file provider only)
    pub path: Option<std::path::PathBuf>,
}

impl StoreSettings {
    /// Valid store providers.
    pub const VALID_PROVIDERS: &'static [&'static str] = &["file", "memory"];

    /// The provider used when none is configured.
    pub const DEFAULT_PROVIDER: &'static str = "file";

    /// Validate the store settings.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(provider) = &self.provider {
            if !Self::VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(SettingsError::InvalidValue(format!(
                    "invalid store provider '{}', must be one of: {}",
                    provider,
                    Self::VALID_PROVIDERS.join(", ")
                )));
            }
            if provider == "memory" && self.path.is_some() {
                return Err(SettingsError::InvalidValue(
                    "store path is only valid for the file provider".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod session_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = SessionConfig::default();
            assert_eq!(config.write_interval(), Duration::from_millis(100));
            assert_eq!(config.store_provider(), "file");
            assert!(config.store_path().is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn zero_interval_rejected() {
            let config = SessionConfig {
                write_interval_ms: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = SessionConfig {
                write_interval_ms: Some(250),
                store: Some(StoreSettings {
                    provider: Some("file".to_string()),
                    path: Some("/tmp/store.toml".into()),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: SessionConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                write_interval_ms = 100
                flush_on_exit = true
            "#;

            let result: Result<SessionConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }

    mod store_settings {
        use super::*;

        #[test]
        fn valid_providers() {
            for provider in ["file", "memory"] {
                let settings = StoreSettings {
                    provider: Some(provider.to_string()),
                    path: None,
                };
                assert!(settings.validate().is_ok());
            }
        }

        #[test]
        fn invalid_provider() {
            let settings = StoreSettings {
                provider: Some("redis".to_string()),
                path: None,
            };
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("redis"));
        }

        #[test]
        fn memory_with_path_rejected() {
            let settings = StoreSettings {
                provider: Some("memory".to_string()),
                path: Some("/tmp/x.toml".into()),
            };
            assert!(settings.validate().is_err());
        }
    }
}
