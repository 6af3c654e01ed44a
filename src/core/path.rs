//! core::path
//!
//! Dot-path addressing for nested config trees.
//!
//! A dot path is `segment(.segment)*`. Inside a map a segment is a key;
//! inside an array it is a base-10 index. Every leaf of a default tree has
//! exactly one dot path, and that path is the key its value is stored under.
//!
//! # Example
//!
//! ```
//! use persisted_config::core::path::{enumerate_leaf_paths, split};
//! use persisted_config::core::value::Node;
//! use serde_json::json;
//!
//! let tree = Node::from_json(json!({"ui": {"theme": "dark", "recent": ["a", "b"]}})).unwrap();
//! let paths: Vec<String> = enumerate_leaf_paths(&tree)
//!     .iter()
//!     .map(|p| p.to_string())
//!     .collect();
//! assert_eq!(paths, ["ui.theme", "ui.recent.0", "ui.recent.1"]);
//!
//! assert_eq!(split("ui.recent.0").unwrap(), ("ui", "recent.0"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::value::Node;

/// A validated dot path.
///
/// Non-empty, and no segment is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DotPath(String);

impl DotPath {
    /// Create a new validated dot path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MalformedPath` for an empty path or one with an
    /// empty segment (`.a`, `a.`, `a..b`).
    pub fn new(path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.split('.').any(str::is_empty) {
            return Err(ConfigError::MalformedPath(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Split into the owning container's prefix and the final member.
    ///
    /// The prefix is empty for a top-level member.
    pub fn parent_and_member(&self) -> (&str, &str) {
        self.0.rsplit_once('.').unwrap_or(("", &self.0))
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DotPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DotPath {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DotPath> for String {
    fn from(path: DotPath) -> Self {
        path.0
    }
}

/// Split a dot path into its first segment and the rest.
///
/// The rest is empty when the path has a single segment.
///
/// # Errors
///
/// Returns `ConfigError::MalformedPath` if the head is empty, or if a
/// separator is followed by nothing.
pub fn split(path: &str) -> Result<(&str, &str), ConfigError> {
    let (head, rest) = match path.split_once('.') {
        Some((_, "")) => return Err(ConfigError::MalformedPath(path.to_string())),
        Some(parts) => parts,
        None => (path, ""),
    };
    if head.is_empty() {
        return Err(ConfigError::MalformedPath(path.to_string()));
    }
    Ok((head, rest))
}

/// Join a container prefix and a member name.
pub fn join(prefix: &str, member: &str) -> String {
    if prefix.is_empty() {
        member.to_string()
    } else {
        format!("{}.{}", prefix, member)
    }
}

/// Every leaf path of `tree`, maps in insertion order, arrays by index.
///
/// Empty containers have no leaves and contribute nothing. A bare leaf at
/// the root has no addressable path.
pub fn enumerate_leaf_paths(tree: &Node) -> Vec<DotPath> {
    let mut paths = Vec::new();
    collect_paths(tree, "", false, &mut paths);
    paths
}

/// Every leaf path of `tree` plus the path of every empty container, in
/// the same order as [`enumerate_leaf_paths`].
///
/// Setting each of these paths rebuilds the full shape of `tree`.
pub fn enumerate_slot_paths(tree: &Node) -> Vec<DotPath> {
    let mut paths = Vec::new();
    collect_paths(tree, "", true, &mut paths);
    paths
}

fn collect_paths(node: &Node, prefix: &str, empty_containers: bool, out: &mut Vec<DotPath>) {
    let is_slot = match node {
        Node::Leaf(_) => true,
        Node::Array(items) => empty_containers && items.is_empty(),
        Node::Map(entries) => empty_containers && entries.is_empty(),
    };
    if is_slot {
        if !prefix.is_empty() {
            out.push(DotPath(prefix.to_string()));
        }
        return;
    }

    match node {
        Node::Leaf(_) => {}
        Node::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_paths(item, &join(prefix, &index.to_string()), empty_containers, out);
            }
        }
        Node::Map(entries) => {
            for (key, child) in entries {
                collect_paths(child, &join(prefix, key), empty_containers, out);
            }
        }
    }
}
