//! live::session
//!
//! A hydrated config session.
//!
//! # Lifecycle
//!
//! `Uninitialized → Hydrating → Live`. [`LiveConfig::open`] performs the
//! hydration and only returns once the session is live, so a `LiveConfig`
//! value is always live. The tree it owns is mutated in place through
//! [`NodeHandle`]s and never replaced.
//!
//! # Persistence
//!
//! Each leaf path gets its own [`Debouncer`] on first write. Store writes
//! are fire-and-forget: a failure is logged and otherwise dropped, and the
//! in-memory value may run ahead of the stored one for up to one window.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::debounce::Debouncer;
use super::node::{NodeHandle, NodeId, NodeTable};
use crate::core::hydrate::hydrate;
use crate::core::path::DotPath;
use crate::core::{navigate, ConfigError, DefaultTree, Node};
use crate::store::ConfigStore;

/// Shared state behind a [`LiveConfig`] and its node handles.
pub(crate) struct Session {
    defaults: DefaultTree,
    tree: Mutex<Node>,
    pub(crate) nodes: NodeTable,
    /// Debounced writers by leaf path
    writers: Mutex<HashMap<String, Debouncer<String>>>,
    store: Arc<dyn ConfigStore>,
    window: Duration,
    runtime: Handle,
    revision: watch::Sender<u64>,
}

impl Session {
    pub(crate) fn tree(&self) -> MutexGuard<'_, Node> {
        lock(&self.tree)
    }

    /// Schedule a debounced store write of `raw` under `path`.
    pub(crate) fn persist(&self, path: String, raw: String) {
        let mut writers = lock(&self.writers);
        writers
            .entry(path)
            .or_insert_with_key(|path| self.writer(path.clone()))
            .call(raw);
    }

    fn writer(&self, key: String) -> Debouncer<String> {
        let store = Arc::clone(&self.store);
        Debouncer::new(self.window, self.runtime.clone(), move |raw: String| {
            let store = Arc::clone(&store);
            let key = key.clone();
            async move {
                match store.write(&key, &raw).await {
                    Ok(()) => debug!(key = %key, "persisted config value"),
                    Err(err) => warn!(key = %key, error = %err, "failed to persist config value"),
                }
            }
        })
    }

    pub(crate) fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

/// A live, hydrated config.
///
/// Clones share the same session; [`LiveConfig::ptr_eq`] tells whether two
/// values are the same session.
#[derive(Clone)]
pub struct LiveConfig {
    session: Arc<Session>,
}

impl LiveConfig {
    /// Hydrate `defaults` from `store` and go live.
    ///
    /// Must be awaited inside a tokio runtime; debounced writes are spawned
    /// onto that runtime.
    ///
    /// # Errors
    ///
    /// Any hydration error, or `Runtime` when no tokio runtime is running.
    pub async fn open(
        defaults: DefaultTree,
        store: Arc<dyn ConfigStore>,
        write_interval: Duration,
    ) -> Result<Self, ConfigError> {
        let runtime = Handle::try_current().map_err(|e| ConfigError::Runtime(e.to_string()))?;

        debug!("config session hydrating");
        let tree = hydrate(&defaults, store.as_ref()).await?;
        let nodes = NodeTable::build(&tree);
        debug!(containers = nodes.len(), "config session live");

        let (revision, _) = watch::channel(0);
        Ok(Self {
            session: Arc::new(Session {
                defaults,
                tree: Mutex::new(tree),
                nodes,
                writers: Mutex::new(HashMap::new()),
                store,
                window: write_interval,
                runtime,
                revision,
            }),
        })
    }

    /// Handle to the root container.
    pub fn root(&self) -> NodeHandle {
        NodeHandle::new(Arc::clone(&self.session), NodeId::ROOT)
    }

    /// Handle to the container at `prefix` (empty for the root).
    ///
    /// # Errors
    ///
    /// - `MalformedPath` for an invalid non-empty prefix
    /// - `PathNotFound` if nothing, or a primitive, lives there
    pub fn node(&self, prefix: &str) -> Result<NodeHandle, ConfigError> {
        if prefix.is_empty() {
            return Ok(self.root());
        }
        let prefix = DotPath::new(prefix)?;
        self.session
            .nodes
            .lookup(prefix.as_str())
            .map(|id| NodeHandle::new(Arc::clone(&self.session), id))
            .ok_or_else(|| ConfigError::PathNotFound(prefix.to_string()))
    }

    /// A copy of the value at `path`.
    pub fn get(&self, path: &str) -> Result<Node, ConfigError> {
        let path = DotPath::new(path)?;
        let tree = self.session.tree();
        navigate::get(&tree, path.as_str())?
            .cloned()
            .ok_or_else(|| ConfigError::PathNotFound(path.to_string()))
    }

    /// Write `value` at `path` through the owning container's handle.
    ///
    /// Same contract as [`NodeHandle::set`].
    pub fn set(&self, path: &str, value: impl Into<Node>) -> Result<(), ConfigError> {
        let path = DotPath::new(path)?;
        let (parent, member) = path.parent_and_member();
        self.node(parent)?.set(member, value)
    }

    /// A copy of the whole live tree.
    pub fn snapshot(&self) -> Node {
        self.session.tree().clone()
    }

    pub fn defaults(&self) -> &DefaultTree {
        &self.session.defaults
    }

    pub fn write_interval(&self) -> Duration {
        self.session.window
    }

    /// Number of leaf paths with a store write waiting for its window.
    pub fn pending_writes(&self) -> usize {
        lock(&self.session.writers)
            .values()
            .filter(|writer| writer.is_pending())
            .count()
    }

    /// Subscribe to applied writes.
    ///
    /// The value is a revision counter bumped once per successful write.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.session.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.session.revision.borrow()
    }

    /// Whether both values are the same session.
    pub fn ptr_eq(&self, other: &LiveConfig) -> bool {
        Arc::ptr_eq(&self.session, &other.session)
    }
}

impl fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveConfig")
            .field("containers", &self.session.nodes.len())
            .field("write_interval", &self.session.window)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
