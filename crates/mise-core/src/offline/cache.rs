use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::kernel::constants::{CACHED_DATA_KEY, CACHE_VERSION};
use crate::offline::types::CachedData;
use crate::storage::{KeyValueStore, PersistedCollection, StorageResult};

/// The persisted `cached_data` read cache. Entries expire lazily: every read
/// first purges what is older than the TTL.
#[derive(Debug)]
pub struct ReadCache {
    entries: PersistedCollection<CachedData>,
    ttl_ms: u64,
}

impl ReadCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_ms: u64) -> Self {
        Self {
            entries: PersistedCollection::new(store, CACHED_DATA_KEY),
            ttl_ms,
        }
    }

    /// Insert or overwrite the entry for `collection`/`key`
    pub fn put(&self, collection: &str, key: &str, data: Value, now_ms: u64) -> StorageResult<CachedData> {
        let entry = CachedData {
            collection: collection.to_string(),
            key: key.to_string(),
            data,
            timestamp: now_ms,
            version: CACHE_VERSION.to_string(),
        };
        let stored = entry.clone();
        self.entries.update(move |entries| {
            match entries
                .iter_mut()
                .find(|e| e.collection == entry.collection && e.key == entry.key)
            {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        })?;
        Ok(stored)
    }

    /// Physically remove expired entries; the store is only rewritten if any expired
    pub fn purge_expired(&self, now_ms: u64) -> StorageResult<usize> {
        let ttl_ms = self.ttl_ms;
        self.entries.retain(|entry| !entry.is_expired(now_ms, ttl_ms))
    }

    pub fn get(&self, collection: &str, key: &str, now_ms: u64) -> Option<CachedData> {
        self.valid_entries(now_ms)
            .into_iter()
            .find(|e| e.collection == collection && e.key == key)
    }

    pub fn get_collection(&self, collection: &str, now_ms: u64) -> Vec<CachedData> {
        self.valid_entries(now_ms)
            .into_iter()
            .filter(|e| e.collection == collection)
            .collect()
    }

    fn valid_entries(&self, now_ms: u64) -> Vec<CachedData> {
        if let Err(e) = self.purge_expired(now_ms) {
            warn!("Failed to purge expired cache entries: {}", e);
        }
        self.entries
            .load()
            .into_iter()
            .filter(|entry| !entry.is_expired(now_ms, self.ttl_ms))
            .collect()
    }
}
