//! Durable storage area backed by a JSON file
//!
//! The whole area is one JSON object. Every write replaces the file through
//! a temporary sibling and a rename, so a crash never leaves a torn file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calrelay_core::{StorageArea, StorageListener, SubscriptionId};
use calrelay_domain::{CalRelayError, Result, StorageChange, StorageScope};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::registry::ListenerRegistry;
use crate::errors::InfraError;

pub struct JsonFileStorageArea {
    path: PathBuf,
    data: Mutex<HashMap<String, Value>>,
    registry: ListenerRegistry,
}

impl JsonFileStorageArea {
    /// Opens (or creates on first write) the area at `path`.
    ///
    /// An unreadable or corrupt file starts the area empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<HashMap<String, Value>>(&contents) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Storage file is corrupt; starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        debug!(path = %path.display(), keys = data.len(), "Opened durable storage");
        Ok(Self { path, data: Mutex::new(data), registry: ListenerRegistry::default() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &HashMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
            }
        }

        let contents = serde_json::to_vec_pretty(data).map_err(InfraError::from)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await.map_err(InfraError::from)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|err| {
            CalRelayError::Storage(format!("failed to replace {}: {err}", self.path.display()))
        })?;
        Ok(())
    }
}

#[async_trait]
impl StorageArea for JsonFileStorageArea {
    fn scope(&self) -> StorageScope {
        StorageScope::Durable
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let old_value = next.insert(key.to_string(), value.clone());
        self.persist(&next).await?;
        *data = next;

        self.registry.notify(&StorageChange {
            key: key.to_string(),
            old_value,
            new_value: Some(value),
        });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.data.lock().await;
        if !data.contains_key(key) {
            return Ok(());
        }

        let mut next = data.clone();
        let old_value = next.remove(key);
        self.persist(&next).await?;
        *data = next;

        self.registry.notify(&StorageChange { key: key.to_string(), old_value, new_value: None });
        Ok(())
    }

    fn subscribe(&self, key: &str, listener: StorageListener) -> SubscriptionId {
        self.registry.subscribe(key, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("durable.json");

        let area = JsonFileStorageArea::open(&path).await.unwrap();
        area.set("authState", json!({"accessToken": "a"})).await.unwrap();
        drop(area);

        let reopened = JsonFileStorageArea::open(&path).await.unwrap();
        assert_eq!(reopened.get("authState").await.unwrap(), Some(json!({"accessToken": "a"})));
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("durable.json");

        let area = JsonFileStorageArea::open(&path).await.unwrap();
        area.set("k", json!(1)).await.unwrap();
        area.remove("k").await.unwrap();

        let reopened = JsonFileStorageArea::open(&path).await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap(), None);
        assert_eq!(reopened.path(), path.as_path());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("durable.json");
        std::fs::write(&path, "{not json").unwrap();

        let area = JsonFileStorageArea::open(&path).await.unwrap();
        assert_eq!(area.get("anything").await.unwrap(), None);
    }
}
