use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::offline::error::OfflineSyncError;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Kind of a queued mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => f.write_str("create"),
            Operation::Update => f.write_str("update"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

impl FromStr for Operation {
    type Err = OfflineSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(OfflineSyncError::UnknownOperation(s.to_string())),
        }
    }
}

/// A mutation waiting to be replayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineData {
    /// `{collection}_{millis}_{9 base-36 chars}`
    pub id: String,
    #[serde(rename = "type")]
    pub operation: Operation,
    pub data: Value,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub retry_count: u32,
}

impl OfflineData {
    pub fn new(collection: &str, operation: Operation, data: Value, now_ms: u64) -> Self {
        Self {
            id: generate_id(collection, now_ms),
            operation,
            data,
            timestamp: now_ms,
            retry_count: 0,
        }
    }

    /// Collection the entry targets: the id minus its last two `_` segments
    pub fn collection(&self) -> Result<&str, OfflineSyncError> {
        self.id
            .rsplitn(3, '_')
            .nth(2)
            .filter(|collection| !collection.is_empty())
            .ok_or_else(|| OfflineSyncError::MalformedEntryId(self.id.clone()))
    }

    /// `data.id` as a path segment, for update and delete
    pub fn payload_id(&self) -> Option<String> {
        match self.data.get("id")? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }
}

fn generate_id(collection: &str, now_ms: u64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", collection, now_ms, suffix)
}

/// A cached read, keyed by collection and key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedData {
    pub collection: String,
    pub key: String,
    pub data: Value,
    pub timestamp: u64,
    pub version: String,
}

impl CachedData {
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) > ttl_ms
    }
}

/// Outcome of one replay pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// No entry was dropped and the pass ran to the end
    pub success: bool,
    pub synced_count: usize,
    pub errors: Vec<String>,
}

/// What `cleanup` removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub expired_cache_entries: usize,
    pub stale_queue_entries: usize,
}
