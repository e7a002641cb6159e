use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::error::{StorageResult, StorageSystemError};
use crate::storage::provider::KeyValueStore;

/// A JSON array persisted under a single store key.
///
/// Every read-modify-write goes through [`PersistedCollection::update`] (or one of
/// its wrappers) and holds the collection's writer lock for the whole cycle, so
/// two writers in this process can never interleave a load and a store.
pub struct PersistedCollection<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    writer: Mutex<()>,
    _items: PhantomData<fn() -> T>,
}

impl<T> PersistedCollection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            writer: Mutex::new(()),
            _items: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the current contents. Missing, unreadable or corrupt data reads as empty.
    pub fn load(&self) -> Vec<T> {
        let _guard = self.lock();
        self.read_unlocked().unwrap_or_else(|e| {
            error!("Failed to read '{}' from {} store: {}", self.key, self.store.name(), e);
            Vec::new()
        })
    }

    /// Run `mutate` against the current contents and persist the result.
    /// A failed read aborts before anything is written.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut Vec<T>) -> R) -> StorageResult<R> {
        let _guard = self.lock();
        let mut items = self.read_unlocked()?;
        let outcome = mutate(&mut items);
        self.write_unlocked(&items)?;
        Ok(outcome)
    }

    /// Keep only the items matching `keep`. The store is rewritten only when
    /// something was removed; returns the number removed.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> StorageResult<usize> {
        let _guard = self.lock();
        let mut items = self.read_unlocked()?;
        let before = items.len();
        items.retain(|item| keep(item));
        let removed = before - items.len();
        if removed > 0 {
            self.write_unlocked(&items)?;
        }
        Ok(removed)
    }

    /// Overwrite the whole collection.
    pub fn replace(&self, items: &[T]) -> StorageResult<()> {
        let _guard = self.lock();
        self.write_unlocked(items)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Store errors propagate; only corrupt JSON falls back to empty
    fn read_unlocked(&self) -> StorageResult<Vec<T>> {
        let Some(raw) = self.store.get(self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("Discarding corrupt '{}' collection: {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_unlocked(&self, items: &[T]) -> StorageResult<()> {
        let raw = serde_json::to_string(items).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;
        self.store.set(self.key, &raw)
    }
}

impl<T> fmt::Debug for PersistedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedCollection")
            .field("key", &self.key)
            .field("store", &self.store.name())
            .finish()
    }
}
