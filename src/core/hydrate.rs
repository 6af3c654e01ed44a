//! core::hydrate
//!
//! Rebuild a typed config tree from flat stored strings.
//!
//! # Algorithm
//!
//! 1. Enumerate every leaf path of the default tree, along with the path
//!    of every empty container
//! 2. Read all leaf paths from the store as one concurrent batch
//! 3. Coerce each stored string to the kind of its default leaf; a missing
//!    record takes the default and is written back (seeded)
//! 4. Assemble the result with [`navigate::set`], the default tree acting
//!    as shape oracle; empty containers are set as themselves, so the result
//!    has exactly the shape of the defaults
//!
//! Any store failure fails the whole hydration. After a successful run the
//! store holds a record for every leaf path.
//!
//! # Example
//!
//! ```
//! use persisted_config::core::hydrate::hydrate;
//! use persisted_config::core::value::{DefaultTree, Node};
//! use persisted_config::store::MemoryStore;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let defaults = DefaultTree::from_json(json!({"ui": {"theme": "dark", "fontSize": 14}})).unwrap();
//! let store = MemoryStore::with_records([("ui.fontSize", "18")]);
//!
//! let live = hydrate(&defaults, &store).await.unwrap();
//!
//! assert_eq!(live, Node::from_json(json!({"ui": {"theme": "dark", "fontSize": 18}})).unwrap());
//! assert_eq!(store.record("ui.theme").as_deref(), Some("dark"));
//! # });
//! ```

use futures::future::try_join_all;
use tracing::debug;

use super::errors::ConfigError;
use super::navigate;
use super::path::{enumerate_slot_paths, DotPath};
use super::value::{DefaultTree, Node, Primitive};
use crate::store::ConfigStore;

/// Hydrate a live tree from `store`, falling back to and seeding `defaults`.
///
/// # Errors
///
/// - `Store` if any read or seed write fails
/// - `InvalidLeafType`, `ShapeMismatch`, `PathNotFound` for trees that break
///   the default-tree invariants
pub async fn hydrate(defaults: &DefaultTree, store: &dyn ConfigStore) -> Result<Node, ConfigError> {
    let slots = enumerate_slot_paths(defaults.root())
        .into_iter()
        .map(|path| -> Result<_, ConfigError> {
            let default = navigate::get(defaults.root(), path.as_str())?
                .ok_or_else(|| ConfigError::PathNotFound(path.to_string()))?;
            Ok((path, default))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let leaves: Vec<&DotPath> = slots
        .iter()
        .filter(|(_, default)| !default.is_container())
        .map(|(path, _)| path)
        .collect();
    debug!(leaves = leaves.len(), slots = slots.len(), "hydrating config");

    let records = try_join_all(leaves.iter().map(|path| store.read(path.as_str()))).await?;
    let mut records = records.into_iter();

    let mut live = defaults.root().empty_like();
    let mut seeds = Vec::new();

    for (path, default) in &slots {
        let value = if default.is_container() {
            default.empty_like()
        } else {
            let value = match records.next().flatten() {
                Some(raw) => coerce(path, &raw, default)?,
                None => {
                    let value = leaf(path, default)?.clone();
                    seeds.push((path, value.to_store_string()));
                    value
                }
            };
            Node::Leaf(value)
        };

        navigate::set(&mut live, path.as_str(), value, defaults.root())?;
    }

    if !seeds.is_empty() {
        debug!(count = seeds.len(), "seeding store with defaults");
        try_join_all(
            seeds
                .iter()
                .map(|(path, value)| store.write(path.as_str(), value)),
        )
        .await?;
    }

    Ok(live)
}

/// Coerce a stored string to the kind of the default leaf at `path`.
///
/// # Errors
///
/// Returns `InvalidLeafType` if `default` is a container.
pub fn coerce(path: &DotPath, raw: &str, default: &Node) -> Result<Primitive, ConfigError> {
    Ok(Primitive::coerce(raw, leaf(path, default)?))
}

fn leaf<'a>(path: &DotPath, default: &'a Node) -> Result<&'a Primitive, ConfigError> {
    default
        .as_primitive()
        .ok_or_else(|| ConfigError::InvalidLeafType(path.to_string()))
}
