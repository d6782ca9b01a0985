//! Key-Value Storage Abstraction
//!
//! Synchronous key/value storage provided by the host (`getStorageSync` and
//! friends). Values are arbitrary JSON.

use serde_json::Value;

use crate::error::Result;

/// Host key-value storage trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::StorageHost;
///
/// fn remember_env(store: &dyn StorageHost) -> bridge_traits::error::Result<()> {
///     store.set_storage_sync("env", serde_json::json!("prod"))
/// }
/// ```
pub trait StorageHost: Send + Sync {
    /// Retrieve a value; `Ok(None)` when the key is absent
    fn get_storage_sync(&self, key: &str) -> Result<Option<Value>>;

    /// Store a value, replacing any previous one
    fn set_storage_sync(&self, key: &str, value: Value) -> Result<()>;

    /// Delete a key
    fn remove_storage_sync(&self, key: &str) -> Result<()>;

    /// Delete every key
    fn clear_storage_sync(&self) -> Result<()>;
}
