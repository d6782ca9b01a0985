//! Web-storage style facade over the host's synchronous key/value store.

use std::sync::Arc;

use bridge_traits::storage::StorageHost;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Which storage tier the SDK should persist to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Local,
    Session,
    None,
}

/// `localStorage`-like passthrough to [`StorageHost`].
///
/// No caching; every call reaches the host.
#[derive(Clone)]
pub struct LocalStorage {
    host: Arc<dyn StorageHost>,
}

impl LocalStorage {
    pub fn new(host: Arc<dyn StorageHost>) -> Self {
        Self { host }
    }

    pub fn set_item(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        debug!(key, "storage set");
        self.host.set_storage_sync(key, value.into())?;
        Ok(())
    }

    /// Value stored under `key`; `None` when absent.
    pub fn get_item(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.host.get_storage_sync(key)?)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        debug!(key, "storage remove");
        self.host.remove_storage_sync(key)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        debug!("storage clear");
        self.host.clear_storage_sync()?;
        Ok(())
    }
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage").finish_non_exhaustive()
    }
}
