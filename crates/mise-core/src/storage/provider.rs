use std::fmt::Debug;

use crate::storage::error::StorageResult;

/// Synchronous durable key-value store shared by the plugin registry
/// snapshot, the offline mutation queue and the read cache.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Get the name of this store
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn delete(&self, key: &str) -> StorageResult<()>;
}
