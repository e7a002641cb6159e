use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::constants::PLUGIN_REGISTRY_KEY;
use crate::plugin_system::manifest::PluginMetadata;
use crate::storage::{KeyValueStore, PersistedCollection, StorageResult};

/// One entry of the persisted registry snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPlugin {
    pub id: String,
    pub metadata: PluginMetadata,
}

/// Registry snapshot stored under the `plugin_registry` key
#[derive(Debug)]
pub struct PluginStateStore {
    entries: PersistedCollection<PersistedPlugin>,
}

impl PluginStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            entries: PersistedCollection::new(store, PLUGIN_REGISTRY_KEY),
        }
    }

    pub fn load(&self) -> Vec<PersistedPlugin> {
        self.entries.load()
    }

    pub fn save(&self, snapshot: &[PersistedPlugin]) -> StorageResult<()> {
        self.entries.replace(snapshot)
    }
}
