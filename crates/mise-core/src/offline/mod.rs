//! # Mise Core Offline Sync
//!
//! Durable buffering of mutations made while disconnected, and a read cache.
//!
//! Mutations are appended to the `offline_data` collection and replayed later
//! against the remote REST API, each entry retried at most
//! [`MAX_RETRY_COUNT`](crate::kernel::constants::MAX_RETRY_COUNT) times. Reads
//! are cached in `cached_data` with a 24 hour TTL. Every change is published
//! as a [`ChangeEvent`](crate::event::ChangeEvent) on the event dispatcher and,
//! optionally, forwarded to a [`RealtimeSink`].
pub mod broadcast;
pub mod cache;
pub mod clock;
pub mod connectivity;
pub mod error;
pub mod manager;
pub mod queue;
pub mod remote;
pub mod sync;
pub mod types;

pub use broadcast::{ChangeBroadcaster, ChannelSink, RealtimeSink, Subscription};
pub use cache::ReadCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use connectivity::ConnectivityMonitor;
pub use error::OfflineSyncError;
pub use manager::OfflineManager;
pub use queue::{MutationQueue, RetryOutcome};
pub use remote::{HttpMethod, HttpRemoteApi, MutationRequest, RemoteApi};
pub use sync::{AutoReplayHandle, OfflineSync, spawn_auto_replay};
pub use types::{CachedData, CleanupReport, OfflineData, Operation, SyncResult};

#[cfg(test)]
mod tests;
