use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource};

/// Declared metadata for a plugin, as served in `config/plugin.json`.
///
/// Only `enabled` changes after a plugin is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    /// Ids of plugins that must be loaded first
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

impl PluginMetadata {
    /// Parse and validate a manifest document fetched for `plugin_id`
    pub fn from_json(plugin_id: &str, raw: &str) -> Result<Self, PluginSystemError> {
        let metadata: PluginMetadata =
            serde_json::from_str(raw).map_err(|e| PluginSystemError::ManifestError {
                plugin_id: plugin_id.to_string(),
                message: "manifest is not valid plugin metadata JSON".to_string(),
                source: Some(Box::new(PluginSystemErrorSource::Json(e))),
            })?;
        metadata.validate(plugin_id)?;
        Ok(metadata)
    }

    /// `name` must be non-empty and `version` a semantic version
    pub fn validate(&self, plugin_id: &str) -> Result<(), PluginSystemError> {
        if self.name.trim().is_empty() {
            return Err(PluginSystemError::ManifestError {
                plugin_id: plugin_id.to_string(),
                message: "name must not be empty".to_string(),
                source: None,
            });
        }
        Version::parse(&self.version).map_err(|e| PluginSystemError::ManifestError {
            plugin_id: plugin_id.to_string(),
            message: format!("version '{}' is not a semantic version", self.version),
            source: Some(Box::new(PluginSystemErrorSource::Version(e))),
        })?;
        Ok(())
    }

    pub fn semver(&self) -> Option<Version> {
        Version::parse(&self.version).ok()
    }

    pub fn depends_on(&self, plugin_id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == plugin_id)
    }
}

/// Plugin ids become URL and filesystem path segments, so they are limited to
/// ASCII letters, digits, `-`, `_` and `.`, and may not start with `.`.
pub fn validate_plugin_id(plugin_id: &str) -> Result<(), PluginSystemError> {
    let reason = if plugin_id.is_empty() {
        Some("id must not be empty")
    } else if plugin_id.starts_with('.') {
        Some("id must not start with '.'")
    } else if !plugin_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("id may only contain ASCII letters, digits, '-', '_' and '.'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(PluginSystemError::InvalidPluginId {
            plugin_id: plugin_id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Builder for plugin metadata
pub struct MetadataBuilder {
    metadata: PluginMetadata,
}

impl MetadataBuilder {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            metadata: PluginMetadata {
                name: name.to_string(),
                version: version.to_string(),
                description: String::new(),
                author: String::new(),
                category: String::new(),
                dependencies: Vec::new(),
                permissions: Vec::new(),
                enabled: false,
                config: None,
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.metadata.description = description.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.metadata.author = author.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.metadata.category = category.to_string();
        self
    }

    /// Add a dependency on another plugin id
    pub fn dependency(mut self, plugin_id: &str) -> Self {
        self.metadata.dependencies.push(plugin_id.to_string());
        self
    }

    pub fn permission(mut self, permission: &str) -> Self {
        self.metadata.permissions.push(permission.to_string());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.metadata.enabled = enabled;
        self
    }

    /// Set one entry of the free-form configuration map
    pub fn config_entry(mut self, key: &str, value: Value) -> Self {
        self.metadata
            .config
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> PluginMetadata {
        self.metadata
    }
}
