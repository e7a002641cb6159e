//! # Mise Core Offline Sync Errors
use thiserror::Error;

use crate::storage::StorageSystemError;

#[derive(Debug, Error)]
pub enum OfflineSyncError {
    #[error("Request {request} failed: {source}")]
    Transport {
        request: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request {request} returned HTTP {status}")]
    Status { request: String, status: u16 },

    #[error("Queued {operation} '{entry_id}' has no payload id")]
    MissingPayloadId { entry_id: String, operation: String },

    #[error("Queued entry id '{0}' does not name a collection")]
    MalformedEntryId(String),

    #[error("Invalid collection name '{0}'")]
    InvalidCollection(String),

    #[error("Unknown operation '{0}', expected create, update or delete")]
    UnknownOperation(String),

    #[error("Invalid API base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Offline store error: {0}")]
    Storage(#[from] StorageSystemError),
}
