//! JSON-file key/value store
//!
//! The whole store is one JSON object, rewritten on every mutation. That is
//! enough for the handful of keys an SDK keeps (tokens, expiry, env).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bridge_traits::{
    error::{BridgeError, Result},
    storage::StorageHost,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// File-backed storage host
pub struct FileStorage {
    path: Option<PathBuf>,
    entries: Mutex<Map<String, Value>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but can't be read or isn't a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| BridgeError::Storage(format!("Failed to read {}: {e}", path.display())))?;
            if raw.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    BridgeError::Storage(format!("Corrupt store {}: {e}", path.display()))
                })?
            }
        } else {
            Map::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "storage opened");
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Store that lives only as long as this value (for testing)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Map::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BridgeError::Storage(format!("Failed to create {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_vec_pretty(entries)
            .map_err(|e| BridgeError::Storage(e.to_string()))?;
        fs::write(path, raw).map_err(|e| {
            warn!(path = %path.display(), error = %e, "storage write failed");
            BridgeError::Storage(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

impl StorageHost for FileStorage {
    fn get_storage_sync(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_storage_sync(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove_storage_sync(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn clear_storage_sync(&self) -> Result<()> {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries)
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("host-adapter-storage-{}", Uuid::new_v4()))
            .join("storage.json")
    }

    #[test]
    fn test_in_memory_store() {
        let store = FileStorage::in_memory();
        assert_eq!(store.get_storage_sync("env").unwrap(), None);

        store.set_storage_sync("env", json!("prod")).unwrap();
        assert_eq!(store.get_storage_sync("env").unwrap(), Some(json!("prod")));

        store.remove_storage_sync("env").unwrap();
        assert_eq!(store.get_storage_sync("env").unwrap(), None);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = scratch_path();
        {
            let store = FileStorage::open(&path).unwrap();
            store.set_storage_sync("access_token", json!("abc")).unwrap();
            store.set_storage_sync("expire", json!(1700000000)).unwrap();
        }

        let store = FileStorage::open(&path).unwrap();
        assert_eq!(store.get_storage_sync("access_token").unwrap(), Some(json!("abc")));
        assert_eq!(store.get_storage_sync("expire").unwrap(), Some(json!(1700000000)));

        store.clear_storage_sync().unwrap();
        let store = FileStorage::open(&path).unwrap();
        assert_eq!(store.get_storage_sync("access_token").unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2").unwrap();

        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, BridgeError::Storage(_)));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
