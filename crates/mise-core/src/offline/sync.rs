use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::event::{ChangeAction, ChangeEvent, SharedEventDispatcher};
use crate::kernel::constants::{CACHE_TTL_MS, MAX_RETRY_COUNT, OFFLINE_DATA_MAX_AGE_MS};
use crate::offline::broadcast::{ChangeBroadcaster, RealtimeSink, Subscription};
use crate::offline::cache::ReadCache;
use crate::offline::clock::{Clock, SystemClock};
use crate::offline::connectivity::ConnectivityMonitor;
use crate::offline::error::OfflineSyncError;
use crate::offline::queue::{MutationQueue, RetryOutcome};
use crate::offline::remote::{MutationRequest, RemoteApi};
use crate::offline::types::{CachedData, CleanupReport, OfflineData, Operation, SyncResult};
use crate::storage::KeyValueStore;

/// Offline mutation queue, read cache and change notifications over one store
pub struct OfflineSync {
    queue: MutationQueue,
    cache: ReadCache,
    remote: Arc<dyn RemoteApi>,
    broadcaster: ChangeBroadcaster,
    clock: Arc<dyn Clock>,
    max_retries: u32,
    max_age_ms: u64,
    // One replay pass at a time
    replay_lock: Mutex<()>,
}

impl OfflineSync {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteApi>,
        events: SharedEventDispatcher,
    ) -> Self {
        Self {
            queue: MutationQueue::new(store.clone()),
            cache: ReadCache::new(store, CACHE_TTL_MS),
            remote,
            broadcaster: ChangeBroadcaster::new(events),
            clock: Arc::new(SystemClock),
            max_retries: MAX_RETRY_COUNT,
            max_age_ms: OFFLINE_DATA_MAX_AGE_MS,
            replay_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Also forward change events to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn RealtimeSink>) -> Self {
        self.broadcaster = self.broadcaster.with_sink(sink);
        self
    }

    fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Queue a mutation for later replay. Returns the new entry id.
    pub async fn enqueue(
        &self,
        collection: &str,
        operation: Operation,
        payload: Value,
    ) -> Result<String, OfflineSyncError> {
        if collection.is_empty() || collection.contains('/') {
            return Err(OfflineSyncError::InvalidCollection(collection.to_string()));
        }
        let entry = OfflineData::new(collection, operation, payload, self.now());
        let id = entry.id.clone();
        let notification = serde_json::to_value(&entry).unwrap_or(Value::Null);
        self.queue.push(entry)?;
        debug!("Queued offline {} {}", operation, id);
        self.publish(ChangeAction::AddOfflineData, notification).await;
        Ok(id)
    }

    /// Queued entries in insertion order
    pub fn pending(&self) -> Vec<OfflineData> {
        self.queue.snapshot()
    }

    /// Replay every queued entry once, in insertion order.
    ///
    /// Successful entries are removed. Failed entries have their retry count
    /// bumped and are dropped, with an error recorded, once they reach the
    /// retry bound. If the queue cannot be rewritten the pass stops and the
    /// remaining entries stay queued untouched.
    pub async fn replay_all(&self) -> SyncResult {
        let _replaying = self.replay_lock.lock().await;
        let mut synced_count = 0;
        let mut errors = Vec::new();

        for entry in self.queue.snapshot() {
            let attempt = match MutationRequest::for_entry(&entry) {
                Ok(request) => self.remote.send(&request).await,
                Err(e) => Err(e),
            };

            let bookkeeping = match attempt {
                Ok(()) => self.queue.remove(&entry.id).map(|_| synced_count += 1),
                Err(cause) => self
                    .queue
                    .record_failure(&entry.id, self.max_retries)
                    .map(|outcome| match outcome {
                        RetryOutcome::Exhausted(dropped) => {
                            warn!("Dropping offline entry {} after {} attempts: {}", dropped.id, dropped.retry_count, cause);
                            errors.push(format!(
                                "{} {} dropped after {} attempts: {}",
                                dropped.operation, dropped.id, dropped.retry_count, cause
                            ));
                        }
                        RetryOutcome::Requeued(retries) => {
                            debug!("Offline entry {} failed (attempt {}): {}", entry.id, retries, cause);
                        }
                        RetryOutcome::Missing => {}
                    }),
            };

            if let Err(e) = bookkeeping {
                error!("Aborting offline replay: {}", e);
                errors.push(format!("replay aborted: {}", e));
                break;
            }
        }

        let result = SyncResult {
            success: errors.is_empty(),
            synced_count,
            errors,
        };
        if synced_count > 0 || !result.success {
            info!(
                "Offline replay finished: {} synced, {} errors",
                result.synced_count,
                result.errors.len()
            );
        }
        let notification = serde_json::to_value(&result).unwrap_or(Value::Null);
        self.publish(ChangeAction::SyncComplete, notification).await;
        result
    }

    /// Insert or refresh a cached read
    pub async fn cache_data(
        &self,
        collection: &str,
        key: &str,
        data: Value,
    ) -> Result<CachedData, OfflineSyncError> {
        let entry = self.cache.put(collection, key, data, self.now())?;
        let notification = serde_json::to_value(&entry).unwrap_or(Value::Null);
        self.publish(ChangeAction::CacheData, notification).await;
        Ok(entry)
    }

    pub fn cached(&self, collection: &str, key: &str) -> Option<CachedData> {
        self.cache.get(collection, key, self.now())
    }

    pub fn cached_collection(&self, collection: &str) -> Vec<CachedData> {
        self.cache.get_collection(collection, self.now())
    }

    /// Purge expired cache entries and queue entries past their maximum age
    pub async fn cleanup(&self) -> Result<CleanupReport, OfflineSyncError> {
        let now = self.now();
        let report = CleanupReport {
            expired_cache_entries: self.cache.purge_expired(now)?,
            stale_queue_entries: self.queue.purge_older_than(now, self.max_age_ms)?,
        };
        if report.expired_cache_entries > 0 || report.stale_queue_entries > 0 {
            info!(
                "Offline cleanup removed {} cache entries and {} stale queue entries",
                report.expired_cache_entries, report.stale_queue_entries
            );
        }
        let notification = serde_json::to_value(report).unwrap_or(Value::Null);
        self.publish(ChangeAction::Cleanup, notification).await;
        Ok(report)
    }

    pub async fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(listener).await
    }

    async fn publish(&self, action: ChangeAction, data: Value) {
        let event = ChangeEvent::new(action, data, self.now());
        self.broadcaster.publish(event).await;
    }
}

impl fmt::Debug for OfflineSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineSync")
            .field("remote", &self.remote)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Stops the auto-replay task
#[derive(Debug)]
pub struct AutoReplayHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutoReplayHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Offline auto-replay task ended abnormally: {}", e);
        }
    }
}

/// Replay the queue every `interval`, and whenever `monitor` reports the
/// transition back online. Nothing is replayed while offline.
pub fn spawn_auto_replay(
    sync: Arc<OfflineSync>,
    monitor: ConnectivityMonitor,
    interval: Duration,
) -> AutoReplayHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let mut connectivity = monitor.subscribe();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        info!("Offline auto-replay started (every {:?})", interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = connectivity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *connectivity.borrow_and_update();
                    if !online {
                        continue;
                    }
                    info!("Connectivity restored, replaying offline queue");
                }
                _ = shutdown_rx.changed() => break,
            }

            if !monitor.is_online() {
                continue;
            }
            let result = sync.replay_all().await;
            if !result.success {
                warn!("Offline replay reported {} errors", result.errors.len());
            }
        }
        info!("Offline auto-replay stopped");
    });

    AutoReplayHandle { shutdown, task }
}
