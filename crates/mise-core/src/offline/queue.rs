use std::sync::Arc;

use crate::kernel::constants::OFFLINE_DATA_KEY;
use crate::offline::types::OfflineData;
use crate::storage::{KeyValueStore, PersistedCollection, StorageResult};

/// What happened to an entry after a failed replay attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome {
    /// Still queued with the new retry count
    Requeued(u32),
    /// Hit the retry bound and was removed
    Exhausted(OfflineData),
    /// No longer in the queue
    Missing,
}

/// The persisted `offline_data` queue, in insertion order
#[derive(Debug)]
pub struct MutationQueue {
    entries: PersistedCollection<OfflineData>,
}

impl MutationQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            entries: PersistedCollection::new(store, OFFLINE_DATA_KEY),
        }
    }

    pub fn push(&self, entry: OfflineData) -> StorageResult<()> {
        self.entries.update(|entries| entries.push(entry))
    }

    pub fn snapshot(&self) -> Vec<OfflineData> {
        self.entries.load()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop an entry after a successful replay
    pub fn remove(&self, id: &str) -> StorageResult<bool> {
        Ok(self.entries.retain(|entry| entry.id != id)? > 0)
    }

    /// Count a failed attempt, removing the entry once it reaches `max_retries`
    pub fn record_failure(&self, id: &str, max_retries: u32) -> StorageResult<RetryOutcome> {
        self.entries.update(|entries| {
            let Some(position) = entries.iter().position(|entry| entry.id == id) else {
                return RetryOutcome::Missing;
            };
            entries[position].retry_count += 1;
            let retries = entries[position].retry_count;
            if retries >= max_retries {
                RetryOutcome::Exhausted(entries.remove(position))
            } else {
                RetryOutcome::Requeued(retries)
            }
        })
    }

    /// Drop entries older than `max_age_ms`, whatever their retry count
    pub fn purge_older_than(&self, now_ms: u64, max_age_ms: u64) -> StorageResult<usize> {
        self.entries.retain(|entry| entry.age_ms(now_ms) <= max_age_ms)
    }
}
