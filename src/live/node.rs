//! live::node
//!
//! Per-container handles over the live tree.
//!
//! # Design
//!
//! Every map and array in the live tree gets a [`NodeId`] when the session
//! goes live. A side table maps each id to the container's absolute dot-path
//! prefix and back, so a write through a handle knows its full leaf path
//! without walking from the root and without any metadata stored in the
//! tree itself.
//!
//! Writes never add or remove members, so the table built at session start
//! stays valid for the whole session.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::session::Session;
use crate::core::navigate::{self, parse_index};
use crate::core::path::join;
use crate::core::{ConfigError, Node};

/// Identity of a container in the live tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root container.
    pub const ROOT: NodeId = NodeId(0);
}

/// Side table from node id to path prefix.
#[derive(Debug, Default)]
pub(crate) struct NodeTable {
    prefixes: Vec<String>,
    ids: HashMap<String, NodeId>,
}

impl NodeTable {
    /// Register every container of `root`, the root itself first.
    pub(crate) fn build(root: &Node) -> Self {
        let mut table = Self::default();
        table.register(root, String::new());
        table
    }

    fn register(&mut self, node: &Node, prefix: String) {
        let children: Vec<(String, &Node)> = match node {
            Node::Leaf(_) => return,
            Node::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (join(&prefix, &i.to_string()), item))
                .collect(),
            Node::Map(entries) => entries
                .iter()
                .map(|(key, child)| (join(&prefix, key), child))
                .collect(),
        };

        let id = NodeId(self.prefixes.len());
        self.prefixes.push(prefix.clone());
        self.ids.insert(prefix, id);

        for (child_prefix, child) in children {
            self.register(child, child_prefix);
        }
    }

    pub(crate) fn prefix(&self, id: NodeId) -> &str {
        &self.prefixes[id.0]
    }

    pub(crate) fn lookup(&self, prefix: &str) -> Option<NodeId> {
        self.ids.get(prefix).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.prefixes.len()
    }
}

/// Read/write access to one container of a live config.
///
/// Handles are cheap to clone and stay valid for the life of the session.
#[derive(Clone)]
pub struct NodeHandle {
    session: Arc<Session>,
    id: NodeId,
}

impl NodeHandle {
    pub(crate) fn new(session: Arc<Session>, id: NodeId) -> Self {
        Self { session, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Absolute dot-path prefix of this container (empty at the root).
    pub fn prefix(&self) -> &str {
        self.session.nodes.prefix(self.id)
    }

    /// Member names in order: map keys, or array indices.
    pub fn members(&self) -> Result<Vec<String>, ConfigError> {
        let tree = self.session.tree();
        member_names(container(&tree, self.prefix())?, self.prefix())
    }

    /// A copy of the current value of `member`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMember` if the container has no such member.
    pub fn get(&self, member: &str) -> Result<Node, ConfigError> {
        let tree = self.session.tree();
        let container = container(&tree, self.prefix())?;
        member_of(container, member)
            .cloned()
            .ok_or_else(|| ConfigError::unknown_member(self.prefix(), member))
    }

    /// The handle of a nested container.
    ///
    /// # Errors
    ///
    /// - `UnknownMember` if the container has no such member
    /// - `PathNotFound` if the member is a primitive
    pub fn child(&self, member: &str) -> Result<NodeHandle, ConfigError> {
        let path = join(self.prefix(), member);
        match self.session.nodes.lookup(&path) {
            Some(id) => Ok(NodeHandle::new(Arc::clone(&self.session), id)),
            None => {
                self.get(member)?;
                Err(ConfigError::PathNotFound(path))
            }
        }
    }

    /// A copy of this whole container.
    pub fn snapshot(&self) -> Result<Node, ConfigError> {
        let tree = self.session.tree();
        container(&tree, self.prefix()).cloned()
    }

    /// Write `value` to `member`.
    ///
    /// A primitive member is replaced. A container member receives a shallow
    /// merge of `value`'s entries, each merged entry being written (and
    /// persisted) at its own path. The write is validated completely before
    /// anything changes.
    ///
    /// # Errors
    ///
    /// - `UnknownMember` if `member`, or any merged entry, is not in the schema
    /// - `TypeMismatch` if a value's kind differs from the existing member's
    pub fn set(&self, member: &str, value: impl Into<Node>) -> Result<(), ConfigError> {
        let value = value.into();
        let prefix = self.prefix();
        let mut writes = Vec::new();

        {
            let mut tree = self.session.tree();
            let container = container_mut(&mut tree, prefix)?;
            let target = member_of_mut(container, member)
                .ok_or_else(|| ConfigError::unknown_member(prefix, member))?;

            let path = join(prefix, member);
            validate(target, &value, &path)?;
            apply(target, value, path, &mut writes);
        }

        if writes.is_empty() {
            return Ok(());
        }
        for (path, raw) in writes {
            trace!(path = %path, "scheduling store write");
            self.session.persist(path, raw);
        }
        self.session.bump_revision();
        Ok(())
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.id)
            .field("prefix", &self.prefix())
            .finish()
    }
}

fn container<'a>(tree: &'a Node, prefix: &str) -> Result<&'a Node, ConfigError> {
    if prefix.is_empty() {
        return Ok(tree);
    }
    navigate::get(tree, prefix)?.ok_or_else(|| ConfigError::PathNotFound(prefix.to_string()))
}

fn container_mut<'a>(tree: &'a mut Node, prefix: &str) -> Result<&'a mut Node, ConfigError> {
    if prefix.is_empty() {
        return Ok(tree);
    }
    navigate::get_mut(tree, prefix)?.ok_or_else(|| ConfigError::PathNotFound(prefix.to_string()))
}

fn member_names(container: &Node, prefix: &str) -> Result<Vec<String>, ConfigError> {
    match container {
        Node::Map(entries) => Ok(entries.keys().cloned().collect()),
        Node::Array(items) => Ok((0..items.len()).map(|i| i.to_string()).collect()),
        Node::Leaf(_) => Err(ConfigError::PathNotFound(prefix.to_string())),
    }
}

fn member_of<'a>(container: &'a Node, member: &str) -> Option<&'a Node> {
    match container {
        Node::Map(entries) => entries.get(member),
        Node::Array(items) => parse_index(member, member).ok().and_then(|i| items.get(i)),
        Node::Leaf(_) => None,
    }
}

fn member_of_mut<'a>(container: &'a mut Node, member: &str) -> Option<&'a mut Node> {
    match container {
        Node::Map(entries) => entries.get_mut(member),
        Node::Array(items) => parse_index(member, member)
            .ok()
            .and_then(move |i| items.get_mut(i)),
        Node::Leaf(_) => None,
    }
}

/// Check a write of `incoming` over `existing` at `path`, recursing into merges.
fn validate(existing: &Node, incoming: &Node, path: &str) -> Result<(), ConfigError> {
    if existing.kind() != incoming.kind() {
        return Err(ConfigError::TypeMismatch {
            path: path.to_string(),
            expected: existing.kind(),
            found: incoming.kind(),
        });
    }

    match (existing, incoming) {
        (Node::Map(current), Node::Map(entries)) => entries.iter().try_for_each(|(key, value)| {
            let child = current
                .get(key)
                .ok_or_else(|| ConfigError::unknown_member(path, key.as_str()))?;
            validate(child, value, &join(path, key))
        }),
        (Node::Array(current), Node::Array(items)) => {
            items.iter().enumerate().try_for_each(|(i, value)| {
                let child = current
                    .get(i)
                    .ok_or_else(|| ConfigError::unknown_member(path, i.to_string()))?;
                validate(child, value, &join(path, &i.to_string()))
            })
        }
        _ => Ok(()),
    }
}

/// Apply a validated write, collecting `(leaf path, stored string)` pairs.
fn apply(existing: &mut Node, incoming: Node, path: String, writes: &mut Vec<(String, String)>) {
    match (existing, incoming) {
        (Node::Map(current), Node::Map(entries)) => {
            for (key, value) in entries {
                if let Some(child) = current.get_mut(&key) {
                    apply(child, value, join(&path, &key), writes);
                }
            }
        }
        (Node::Array(current), Node::Array(items)) => {
            for (i, value) in items.into_iter().enumerate() {
                if let Some(child) = current.get_mut(i) {
                    apply(child, value, join(&path, &i.to_string()), writes);
                }
            }
        }
        (slot, Node::Leaf(value)) => {
            writes.push((path, value.to_store_string()));
            *slot = Node::Leaf(value);
        }
        _ => {}
    }
}
