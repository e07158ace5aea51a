//! In-memory storage area

use std::collections::HashMap;

use async_trait::async_trait;
use calrelay_core::{StorageArea, StorageListener, SubscriptionId};
use calrelay_domain::{Result, StorageChange, StorageScope};
use parking_lot::Mutex;
use serde_json::Value;

use super::registry::ListenerRegistry;

/// Storage area that lives as long as the process.
///
/// The data lock is held while listeners run, so notifications for a key are
/// delivered in write order.
pub struct MemoryStorageArea {
    scope: StorageScope,
    data: Mutex<HashMap<String, Value>>,
    registry: ListenerRegistry,
}

impl MemoryStorageArea {
    pub fn new(scope: StorageScope) -> Self {
        Self { scope, data: Mutex::new(HashMap::new()), registry: ListenerRegistry::default() }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

#[async_trait]
impl StorageArea for MemoryStorageArea {
    fn scope(&self) -> StorageScope {
        self.scope
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut data = self.data.lock();
        let old_value = data.insert(key.to_string(), value.clone());
        self.registry.notify(&StorageChange {
            key: key.to_string(),
            old_value,
            new_value: Some(value),
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.data.lock();
        if let Some(old_value) = data.remove(key) {
            self.registry.notify(&StorageChange {
                key: key.to_string(),
                old_value: Some(old_value),
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self, key: &str, listener: StorageListener) -> SubscriptionId {
        self.registry.subscribe(key, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }
}
