//! Typed access to the stored records
//!
//! Undecodable records are reported as absent: a corrupt `authState` means
//! signed out, a corrupt `activeJob` means no job.

use std::sync::Arc;

use calrelay_domain::constants::{ACTIVE_JOB_KEY, AUTH_STATE_KEY};
use calrelay_domain::{ActiveJob, AuthState, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::ports::StorageArea;

async fn load_record<T: DeserializeOwned>(area: &dyn StorageArea, key: &str) -> Result<Option<T>> {
    let Some(value) = area.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            warn!(key, error = %err, "Ignoring malformed stored record");
            Ok(None)
        }
    }
}

async fn save_record<T: Serialize>(area: &dyn StorageArea, key: &str, record: &T) -> Result<()> {
    let value = serde_json::to_value(record)?;
    area.set(key, value).await
}

/// `activeJob` in the ephemeral scope
#[derive(Clone)]
pub struct JobRepository {
    area: Arc<dyn StorageArea>,
}

impl JobRepository {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    pub async fn load(&self) -> Result<Option<ActiveJob>> {
        load_record(self.area.as_ref(), ACTIVE_JOB_KEY).await
    }

    pub async fn save(&self, job: &ActiveJob) -> Result<()> {
        save_record(self.area.as_ref(), ACTIVE_JOB_KEY, job).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.area.remove(ACTIVE_JOB_KEY).await
    }
}

/// `authState` in the durable scope
#[derive(Clone)]
pub struct AuthRepository {
    area: Arc<dyn StorageArea>,
}

impl AuthRepository {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    pub async fn load(&self) -> Result<Option<AuthState>> {
        load_record(self.area.as_ref(), AUTH_STATE_KEY).await
    }

    pub async fn save(&self, auth: &AuthState) -> Result<()> {
        save_record(self.area.as_ref(), AUTH_STATE_KEY, auth).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.area.remove(AUTH_STATE_KEY).await
    }
}
