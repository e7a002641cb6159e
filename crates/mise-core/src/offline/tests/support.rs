#![cfg(test)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::event::SharedEventDispatcher;
use crate::offline::clock::ManualClock;
use crate::offline::error::OfflineSyncError;
use crate::offline::remote::{MutationRequest, RemoteApi};
use crate::offline::sync::OfflineSync;
use crate::storage::{KeyValueStore, MemoryKeyValueStore, StorageResult, StorageSystemError};

pub const NOW: u64 = 1_700_000_000_000;

/// Records every request; fails all of them while `online` is false
#[derive(Debug)]
pub struct MockRemote {
    online: AtomicBool,
    pub requests: Mutex<Vec<String>>,
}

impl MockRemote {
    pub fn new(online: bool) -> Arc<Self> {
        Arc::new(Self {
            online: AtomicBool::new(online),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn send(&self, request: &MutationRequest) -> Result<(), OfflineSyncError> {
        self.requests.lock().expect("requests lock").push(request.to_string());
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(OfflineSyncError::Status {
                request: request.to_string(),
                status: 503,
            })
        }
    }
}

/// Memory store whose reads or writes can be switched to fail
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageSystemError::io(
                std::io::Error::other("read failed"),
                "read",
                key.into(),
            ));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageSystemError::io(
                std::io::Error::other("disk full"),
                "write",
                key.into(),
            ));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key)
    }
}

pub struct Harness {
    pub sync: OfflineSync,
    pub remote: Arc<MockRemote>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<dyn KeyValueStore>,
    pub events: SharedEventDispatcher,
}

pub fn harness(online: bool) -> Harness {
    harness_with_store(Arc::new(MemoryKeyValueStore::new()), online)
}

pub fn harness_with_store(store: Arc<dyn KeyValueStore>, online: bool) -> Harness {
    let remote = MockRemote::new(online);
    let clock = Arc::new(ManualClock::new(NOW));
    let events = SharedEventDispatcher::new();
    let sync = OfflineSync::new(store.clone(), remote.clone(), events.clone()).with_clock(clock.clone());
    Harness {
        sync,
        remote,
        clock,
        store,
        events,
    }
}
