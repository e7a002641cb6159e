//! # Mise Core Plugin System Errors
//!
//! [`PluginSystemError`] covers every way a plugin operation can be refused:
//! metadata that cannot be fetched or validated, frontend resources that cannot
//! be read, unknown plugins, and dependency violations ([`DependencyError`]).
use std::fmt;

use crate::plugin_system::dependency::DependencyError;

/// Which frontend resource a [`PluginSystemError::ComponentLoad`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Components,
    Routes,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Components => f.write_str("components"),
            ResourceKind::Routes => f.write_str("routes"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Failed to fetch metadata for plugin '{plugin_id}' from '{location}': {source}")]
    MetadataFetch {
        plugin_id: String,
        location: String,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("Invalid metadata for plugin '{plugin_id}': {message}")]
    ManifestError {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Box<PluginSystemErrorSource>>,
    },

    #[error("Failed to load {kind} for plugin '{plugin_id}': {source}")]
    ComponentLoad {
        plugin_id: String,
        kind: ResourceKind,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("Plugin discovery failed at '{location}': {source}")]
    Discovery {
        location: String,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("Invalid plugin id '{plugin_id}': {reason}")]
    InvalidPluginId { plugin_id: String, reason: String },

    #[error("Plugin '{plugin_id}' is not registered")]
    NotRegistered { plugin_id: String },

    #[error("Plugin '{plugin_id}' is not loaded")]
    NotLoaded { plugin_id: String },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),
}

impl PluginSystemError {
    /// Errors caused by I/O against a manifest or resource source, as opposed
    /// to a refused operation.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            PluginSystemError::MetadataFetch { .. }
                | PluginSystemError::ComponentLoad { .. }
                | PluginSystemError::Discovery { .. }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemErrorSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error(transparent)]
    Version(#[from] semver::Error),
    #[error("{0}")]
    Other(String),
}
