//! live::cell
//!
//! Observable single-value cell.
//!
//! The cell notifies subscribers when its value is replaced. It knows
//! nothing about mutation inside the value; a [`LiveConfig`] held in a cell
//! reports its own leaf writes through
//! [`LiveConfig::subscribe_changes`](super::LiveConfig::subscribe_changes).
//!
//! [`LiveConfig`]: super::LiveConfig

use std::sync::Arc;

use tokio::sync::watch;

/// A replaceable value with subscribers.
///
/// Clones share the same value.
#[derive(Debug)]
pub struct ConfigCell<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for ConfigCell<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T: Clone> ConfigCell<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A clone of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replace the value, notifying subscribers. Returns the old value.
    pub fn replace(&self, value: T) -> T {
        self.sender.send_replace(value)
    }

    /// Subscribe to replacements.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}
