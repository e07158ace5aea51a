//! Port interface for host storage areas
//!
//! Both the durable and the ephemeral scope expose the same surface. Change
//! listeners are registered per key and invoked synchronously, in write
//! order, by the area that performed the write.

use std::sync::Arc;

use async_trait::async_trait;
use calrelay_domain::{Result, StorageChange, StorageScope};
use serde_json::Value;

/// Callback invoked for every change to a subscribed key
pub type StorageListener = Arc<dyn Fn(&StorageChange) + Send + Sync>;

/// Handle returned by [`StorageArea::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A single storage area (one scope)
#[async_trait]
pub trait StorageArea: Send + Sync {
    /// Scope this area represents
    fn scope(&self) -> StorageScope;

    /// Read a key; `None` when absent
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a key and notify its listeners
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key and notify its listeners; removing a missing key is a
    /// no-op without notification
    async fn remove(&self, key: &str) -> Result<()>;

    /// Register a change listener for `key`
    fn subscribe(&self, key: &str, listener: StorageListener) -> SubscriptionId;

    /// Drop a listener; returns false when the id was unknown
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
