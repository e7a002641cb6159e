use std::collections::HashMap;

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginMetadata;
use crate::plugin_system::plugin::{Plugin, PluginComponent, PluginRoute};
use crate::plugin_system::state::PersistedPlugin;

/// Registry of known plugins plus the ordered list of loaded ids.
///
/// Every id in `loaded` is a key of `plugins`. A plugin is only enabled while
/// loaded, and a loaded plugin cannot be removed while another loaded plugin
/// declares it as a dependency.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Plugin>,
    loaded: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin that is known but not loaded. Existing entries win.
    pub fn register(&mut self, plugin: Plugin) -> bool {
        if self.plugins.contains_key(&plugin.id) {
            return false;
        }
        self.plugins.insert(plugin.id.clone(), plugin);
        true
    }

    /// Insert a freshly loaded plugin and append it to the load order.
    ///
    /// Fails without mutating anything when a declared dependency is not
    /// loaded. An unloaded entry with the same id is replaced, keeping its
    /// persisted `enabled` flag. Returns `false` if the plugin was already loaded.
    pub fn insert_loaded(&mut self, mut plugin: Plugin) -> Result<bool, PluginSystemError> {
        if self.is_loaded(&plugin.id) {
            return Ok(false);
        }
        let missing = self.missing_dependencies(&plugin.metadata);
        if !missing.is_empty() {
            return Err(DependencyError::MissingDependencies {
                plugin_id: plugin.id,
                missing,
            }
            .into());
        }
        if let Some(previous) = self.plugins.get(&plugin.id) {
            plugin.metadata.enabled = previous.metadata.enabled;
        }
        self.loaded.push(plugin.id.clone());
        self.plugins.insert(plugin.id.clone(), plugin);
        Ok(true)
    }

    /// Remove a loaded plugin from the registry. Returns `None` if it was not loaded.
    pub fn remove_loaded(&mut self, plugin_id: &str) -> Result<Option<Plugin>, PluginSystemError> {
        if !self.is_loaded(plugin_id) {
            return Ok(None);
        }
        let dependents = self.dependents_of(plugin_id);
        if !dependents.is_empty() {
            return Err(DependencyError::HasDependents {
                plugin_id: plugin_id.to_string(),
                dependents,
            }
            .into());
        }
        self.loaded.retain(|id| id != plugin_id);
        Ok(self.plugins.remove(plugin_id))
    }

    /// Set the enabled flag. Enabling requires the plugin to be loaded.
    /// Returns whether the flag changed.
    pub fn set_enabled(&mut self, plugin_id: &str, enabled: bool) -> Result<bool, PluginSystemError> {
        let loaded = self.is_loaded(plugin_id);
        let plugin = self
            .plugins
            .get_mut(plugin_id)
            .ok_or_else(|| PluginSystemError::NotRegistered {
                plugin_id: plugin_id.to_string(),
            })?;
        if enabled && !loaded {
            return Err(PluginSystemError::NotLoaded {
                plugin_id: plugin_id.to_string(),
            });
        }
        let changed = plugin.metadata.enabled != enabled;
        plugin.metadata.enabled = enabled;
        Ok(changed)
    }

    /// Declared dependencies that are not currently loaded, in declaration order
    pub fn missing_dependencies(&self, metadata: &PluginMetadata) -> Vec<String> {
        metadata
            .dependencies
            .iter()
            .filter(|dep| !self.is_loaded(dep))
            .cloned()
            .collect()
    }

    /// Loaded plugins that declare `plugin_id` as a dependency, in load order
    pub fn dependents_of(&self, plugin_id: &str) -> Vec<String> {
        self.loaded
            .iter()
            .filter(|id| {
                self.plugins
                    .get(id.as_str())
                    .is_some_and(|p| p.metadata.depends_on(plugin_id))
            })
            .cloned()
            .collect()
    }

    pub fn get(&self, plugin_id: &str) -> Option<&Plugin> {
        self.plugins.get(plugin_id)
    }

    pub fn component(&self, plugin_id: &str, component_id: &str) -> Option<&PluginComponent> {
        self.plugins.get(plugin_id)?.component(component_id)
    }

    pub fn is_registered(&self, plugin_id: &str) -> bool {
        self.plugins.contains_key(plugin_id)
    }

    pub fn is_loaded(&self, plugin_id: &str) -> bool {
        self.loaded.iter().any(|id| id == plugin_id)
    }

    /// Loaded and flagged enabled
    pub fn is_enabled(&self, plugin_id: &str) -> bool {
        self.is_loaded(plugin_id)
            && self
                .plugins
                .get(plugin_id)
                .is_some_and(|p| p.metadata.enabled)
    }

    /// Routes of one plugin; empty unless it is enabled
    pub fn routes(&self, plugin_id: &str) -> Vec<PluginRoute> {
        match self.plugins.get(plugin_id) {
            Some(plugin) if self.is_enabled(plugin_id) => plugin.routes.clone(),
            _ => Vec::new(),
        }
    }

    /// Routes of every enabled plugin, in load order
    pub fn enabled_routes(&self) -> Vec<PluginRoute> {
        self.loaded
            .iter()
            .filter(|id| self.is_enabled(id))
            .filter_map(|id| self.plugins.get(id.as_str()))
            .flat_map(|plugin| plugin.routes.iter().cloned())
            .collect()
    }

    pub fn loaded_ids(&self) -> &[String] {
        &self.loaded
    }

    /// Every registered plugin: loaded ones in load order, then the rest by id
    pub fn plugins(&self) -> Vec<&Plugin> {
        let mut unloaded: Vec<&Plugin> = self
            .plugins
            .values()
            .filter(|p| !self.is_loaded(&p.id))
            .collect();
        unloaded.sort_by(|a, b| a.id.cmp(&b.id));
        self.loaded
            .iter()
            .filter_map(|id| self.plugins.get(id.as_str()))
            .chain(unloaded)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Persistable view of the registry, in [`PluginRegistry::plugins`] order
    pub fn snapshot(&self) -> Vec<PersistedPlugin> {
        self.plugins()
            .into_iter()
            .map(|p| PersistedPlugin {
                id: p.id.clone(),
                metadata: p.metadata.clone(),
            })
            .collect()
    }
}
