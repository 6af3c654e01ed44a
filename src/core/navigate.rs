//! core::navigate
//!
//! Read and write slots of a config tree by dot path.
//!
//! # Shape Oracle
//!
//! [`set`] may have to create containers that do not exist yet. It decides
//! between an array and a map by looking at the same position in a shape
//! oracle, normally the default tree. The oracle is also what makes a path
//! legal: an intermediate segment the oracle does not define is not found.
//!
//! # Example
//!
//! ```
//! use persisted_config::core::navigate::{get, set};
//! use persisted_config::core::value::Node;
//! use serde_json::json;
//!
//! let oracle = Node::from_json(json!({"recent": ["a", "b"]})).unwrap();
//! let mut tree = Node::empty_map();
//!
//! set(&mut tree, "recent.0", Node::from("x"), &oracle).unwrap();
//! assert!(matches!(get(&tree, "recent").unwrap(), Some(Node::Array(_))));
//! assert_eq!(get(&tree, "recent.0").unwrap().and_then(Node::as_str), Some("x"));
//! ```

use super::errors::ConfigError;
use super::path::split;
use super::value::Node;

/// Resolve `path` against `container`.
///
/// A missing final member is `Ok(None)`.
///
/// # Errors
///
/// - `MalformedPath` for an empty segment or a non-numeric array index
/// - `PathNotFound` if a primitive or a missing member is met with path left
pub fn get<'a>(container: &'a Node, path: &str) -> Result<Option<&'a Node>, ConfigError> {
    get_in(container, path, path)
}

fn get_in<'a>(
    container: &'a Node,
    remaining: &str,
    full: &str,
) -> Result<Option<&'a Node>, ConfigError> {
    let (head, rest) = split(remaining)?;
    let next = match container {
        Node::Array(items) => items.get(parse_index(head, full)?),
        Node::Map(entries) => entries.get(head),
        Node::Leaf(_) => return Err(ConfigError::PathNotFound(full.to_string())),
    };

    if rest.is_empty() {
        return Ok(next);
    }
    match next {
        Some(node) if node.is_container() => get_in(node, rest, full),
        _ => Err(ConfigError::PathNotFound(full.to_string())),
    }
}

/// Mutable counterpart of [`get`], with the same rules.
pub fn get_mut<'a>(container: &'a mut Node, path: &str) -> Result<Option<&'a mut Node>, ConfigError> {
    get_mut_in(container, path, path)
}

fn get_mut_in<'a>(
    container: &'a mut Node,
    remaining: &str,
    full: &str,
) -> Result<Option<&'a mut Node>, ConfigError> {
    let (head, rest) = split(remaining)?;
    let next = match container {
        Node::Array(items) => items.get_mut(parse_index(head, full)?),
        Node::Map(entries) => entries.get_mut(head),
        Node::Leaf(_) => return Err(ConfigError::PathNotFound(full.to_string())),
    };

    if rest.is_empty() {
        return Ok(next);
    }
    match next {
        Some(node) => {
            if node.is_container() {
                get_mut_in(node, rest, full)
            } else {
                Err(ConfigError::PathNotFound(full.to_string()))
            }
        }
        None => Err(ConfigError::PathNotFound(full.to_string())),
    }
}

/// Write `value` at `path`, creating intermediate containers on demand.
///
/// # Errors
///
/// - `MalformedPath` for an empty segment or a non-numeric array index
/// - `ShapeMismatch` if `container` and `oracle` disagree on array vs. map
/// - `PathNotFound` if the oracle lacks an intermediate segment, a primitive
///   is met with path left, or an array index skips past a slot the oracle
///   holds a primitive in
///
/// Array slots skipped over are filled with empty containers of the oracle's
/// shape.
pub fn set(container: &mut Node, path: &str, value: Node, oracle: &Node) -> Result<(), ConfigError> {
    set_in(container, path, value, oracle, path)
}

fn set_in(
    container: &mut Node,
    remaining: &str,
    value: Node,
    oracle: &Node,
    full: &str,
) -> Result<(), ConfigError> {
    let (head, rest) = split(remaining)?;

    match (container, oracle) {
        (Node::Array(items), Node::Array(defaults)) => {
            let index = parse_index(head, full)?;
            // Skipped slots are only allowed where the oracle holds containers.
            while items.len() < index {
                match defaults.get(items.len()) {
                    Some(skipped) if skipped.is_container() => items.push(skipped.empty_like()),
                    _ => return Err(ConfigError::PathNotFound(full.to_string())),
                }
            }

            if rest.is_empty() {
                if index == items.len() {
                    items.push(value);
                } else {
                    items[index] = value;
                }
                return Ok(());
            }

            let default = defaults
                .get(index)
                .ok_or_else(|| ConfigError::PathNotFound(full.to_string()))?;
            if index == items.len() {
                items.push(default.empty_like());
            }
            set_in(&mut items[index], rest, value, default, full)
        }
        (Node::Map(entries), Node::Map(defaults)) => {
            if rest.is_empty() {
                entries.insert(head.to_string(), value);
                return Ok(());
            }

            let default = defaults
                .get(head)
                .ok_or_else(|| ConfigError::PathNotFound(full.to_string()))?;
            let child = entries
                .entry(head.to_string())
                .or_insert_with(|| default.empty_like());
            set_in(child, rest, value, default, full)
        }
        (Node::Leaf(_), _) => Err(ConfigError::PathNotFound(full.to_string())),
        (found, expected) => Err(ConfigError::ShapeMismatch {
            path: full.to_string(),
            expected: expected.kind(),
            found: found.kind(),
        }),
    }
}

/// Parse an array index segment.
pub(crate) fn parse_index(segment: &str, full: &str) -> Result<usize, ConfigError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::MalformedPath(full.to_string()));
    }
    segment
        .parse()
        .map_err(|_| ConfigError::MalformedPath(full.to_string()))
}
