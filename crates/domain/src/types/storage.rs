//! Storage scopes and change notifications

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_status_conversions;

/// Lifetime of a storage area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    /// Survives browser restarts (`authState`)
    Durable,
    /// Cleared when the browser session ends (`activeJob`, `sidebarSessionId`)
    Ephemeral,
}

impl_status_conversions!(StorageScope {
    Durable => "durable",
    Ephemeral => "ephemeral",
});

/// A single key change, delivered to subscribers in write order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl StorageChange {
    /// True when the key was removed by this change.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.new_value.is_none()
    }
}
