//! core::errors
//!
//! Error taxonomy for path handling, hydration, and live writes.
//!
//! # Design
//!
//! Every variant except [`ConfigError::Store`] describes a programmer or
//! schema error. None of them are retried; they surface to the caller of the
//! operation that triggered them. Store failures are wrapped unchanged.
//!
//! # Example
//!
//! ```
//! use persisted_config::core::{ConfigError, Kind};
//!
//! let err = ConfigError::TypeMismatch {
//!     path: "ui.fontSize".to_string(),
//!     expected: Kind::Number,
//!     found: Kind::String,
//! };
//! assert!(err.to_string().contains("ui.fontSize"));
//! ```

use thiserror::Error;

use super::value::Kind;
use crate::config::SettingsError;
use crate::store::StoreError;

/// Errors from config hydration, navigation, and writes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The dot path is syntactically invalid (empty segment, empty path).
    #[error("malformed dot path '{0}'")]
    MalformedPath(String),

    /// The path descends through a primitive or an absent member.
    #[error("path not found: '{0}'")]
    PathNotFound(String),

    /// A container and its shape oracle disagree on array vs. map.
    #[error("shape mismatch at '{path}': schema has {expected}, found {found}")]
    ShapeMismatch {
        /// Full path being traversed
        path: String,
        /// Shape held by the oracle
        expected: Kind,
        /// Shape held by the container
        found: Kind,
    },

    /// Write to a member the schema does not define.
    #[error("'{member}' is not a member of '{parent}'")]
    UnknownMember {
        /// Prefix of the container written to (`<root>` at the top)
        parent: String,
        /// The rejected member name
        member: String,
    },

    /// Write value has a different kind than the existing member.
    #[error("value for '{path}' must be {expected}, got {found}")]
    TypeMismatch {
        /// Full path of the member
        path: String,
        /// Kind of the existing member
        expected: Kind,
        /// Kind of the rejected value
        found: Kind,
    },

    /// The default at a coerced path is not a primitive.
    #[error("default at '{0}' is not a primitive leaf")]
    InvalidLeafType(String),

    /// The default tree was rejected at construction.
    #[error("invalid default config: {0}")]
    InvalidDefault(String),

    /// No async runtime was available to schedule persistence.
    #[error("runtime unavailable: {0}")]
    Runtime(String),

    /// Session settings could not be loaded or validated.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ConfigError {
    /// Build an `UnknownMember` error, naming the root container `<root>`.
    pub(crate) fn unknown_member(parent: &str, member: impl Into<String>) -> Self {
        let parent = if parent.is_empty() {
            "<root>".to_string()
        } else {
            parent.to_string()
        };
        ConfigError::UnknownMember {
            parent,
            member: member.into(),
        }
    }
}
