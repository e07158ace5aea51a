//! Uniform durable/ephemeral storage surface

use std::sync::Arc;

use calrelay_core::StorageArea;
use calrelay_domain::StorageScope;
use tracing::{info, warn};

use super::memory::MemoryStorageArea;

/// Both storage scopes behind one handle.
///
/// A host without a session-scoped area gets an in-memory one that lives as
/// long as the background process.
#[derive(Clone)]
pub struct StorageAdapter {
    durable: Arc<dyn StorageArea>,
    ephemeral: Arc<dyn StorageArea>,
    ephemeral_fallback: bool,
}

impl StorageAdapter {
    pub fn new(durable: Arc<dyn StorageArea>, ephemeral: Option<Arc<dyn StorageArea>>) -> Self {
        match ephemeral {
            Some(ephemeral) => {
                info!("Using host ephemeral storage");
                Self { durable, ephemeral, ephemeral_fallback: false }
            }
            None => {
                warn!("Host has no ephemeral storage; using in-memory area");
                Self {
                    durable,
                    ephemeral: Arc::new(MemoryStorageArea::new(StorageScope::Ephemeral)),
                    ephemeral_fallback: true,
                }
            }
        }
    }

    pub fn durable(&self) -> Arc<dyn StorageArea> {
        Arc::clone(&self.durable)
    }

    pub fn ephemeral(&self) -> Arc<dyn StorageArea> {
        Arc::clone(&self.ephemeral)
    }

    /// True when the ephemeral scope is the in-memory fallback
    pub fn is_ephemeral_fallback(&self) -> bool {
        self.ephemeral_fallback
    }
}
