//! Per-key listener registry shared by the storage areas

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use calrelay_core::{StorageListener, SubscriptionId};
use calrelay_domain::StorageChange;
use parking_lot::RwLock;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, String, StorageListener)>>,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&self, key: &str, listener: StorageListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.listeners.write().push((id, key.to_string(), listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _, _)| *existing != id);
        listeners.len() != before
    }

    /// Invokes every listener of `change.key`. The registry lock is released
    /// first, so listeners may subscribe or unsubscribe.
    pub(crate) fn notify(&self, change: &StorageChange) {
        let matching: Vec<StorageListener> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, key, _)| *key == change.key)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();

        for listener in matching {
            listener(change);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.read().len()
    }
}
