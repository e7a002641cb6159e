use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::Event;

/// Emitted by the plugin manager after a successful state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginLifecycleEvent {
    Loaded { plugin_id: String },
    Unloaded { plugin_id: String },
    Enabled { plugin_id: String },
    Disabled { plugin_id: String },
}

impl PluginLifecycleEvent {
    pub fn plugin_id(&self) -> &str {
        match self {
            PluginLifecycleEvent::Loaded { plugin_id }
            | PluginLifecycleEvent::Unloaded { plugin_id }
            | PluginLifecycleEvent::Enabled { plugin_id }
            | PluginLifecycleEvent::Disabled { plugin_id } => plugin_id,
        }
    }
}

impl Event for PluginLifecycleEvent {
    fn name(&self) -> &'static str {
        match self {
            PluginLifecycleEvent::Loaded { .. } => "plugin.loaded",
            PluginLifecycleEvent::Unloaded { .. } => "plugin.unloaded",
            PluginLifecycleEvent::Enabled { .. } => "plugin.enabled",
            PluginLifecycleEvent::Disabled { .. } => "plugin.disabled",
        }
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// What changed in the offline store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    AddOfflineData,
    CacheData,
    SyncComplete,
    Cleanup,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeAction::AddOfflineData => "add_offline_data",
            ChangeAction::CacheData => "cache_data",
            ChangeAction::SyncComplete => "sync_complete",
            ChangeAction::Cleanup => "cleanup",
        };
        f.write_str(label)
    }
}

/// Change notification published by the offline queue and read cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub action: ChangeAction,
    pub data: Value,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl ChangeEvent {
    pub const NAME: &'static str = "offline.change";

    pub fn new(action: ChangeAction, data: Value, timestamp: u64) -> Self {
        Self { action, data, timestamp }
    }
}

impl Event for ChangeEvent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
