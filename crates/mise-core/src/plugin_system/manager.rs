use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::{debug, error, info, warn};

use crate::event::{PluginLifecycleEvent, SharedEventDispatcher};
use crate::kernel::component::KernelComponent;
use crate::kernel::error::Result;
use crate::plugin_system::dependency::resolve_load_order;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::validate_plugin_id;
use crate::plugin_system::plugin::{Plugin, PluginComponent, PluginRoute};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::state::PluginStateStore;
use crate::plugin_system::traits::{ComponentLoader, ManifestSource};
use crate::storage::KeyValueStore;

/// Plugin system component interface.
///
/// Mutating operations report success as a boolean and log the cause of a
/// failure; they never panic. Reads are synchronous and side-effect free.
#[async_trait]
pub trait PluginManager: KernelComponent {
    /// Load a plugin whose dependencies are already loaded
    async fn load_plugin(&self, plugin_id: &str) -> bool;

    /// Unload a plugin nothing else depends on
    async fn unload_plugin(&self, plugin_id: &str) -> bool;

    /// Enable a registered plugin, loading it first if needed
    async fn enable_plugin(&self, plugin_id: &str) -> bool;

    /// Clear the enabled flag without unloading
    async fn disable_plugin(&self, plugin_id: &str) -> bool;

    fn get_plugin(&self, plugin_id: &str) -> Option<Plugin>;

    fn get_component(&self, plugin_id: &str, component_id: &str) -> Option<PluginComponent>;

    /// Routes of one plugin; empty unless it is loaded and enabled
    fn get_plugin_routes(&self, plugin_id: &str) -> Vec<PluginRoute>;

    /// Routes of every enabled plugin, in load order
    fn get_all_routes(&self) -> Vec<PluginRoute>;

    fn is_plugin_loaded(&self, plugin_id: &str) -> bool;

    fn is_plugin_enabled(&self, plugin_id: &str) -> bool;

    /// Every registered plugin, loaded ones first in load order
    fn plugins(&self) -> Vec<Plugin>;

    fn loaded_plugins(&self) -> Vec<String>;

    /// Loaded plugins that depend on `plugin_id`
    fn dependents_of(&self, plugin_id: &str) -> Vec<String>;
}

/// Default implementation of plugin manager
pub struct DefaultPluginManager {
    name: &'static str,
    registry: Arc<RwLock<PluginRegistry>>,
    manifests: Arc<dyn ManifestSource>,
    loader: Arc<dyn ComponentLoader>,
    state: Option<PluginStateStore>,
    events: Option<SharedEventDispatcher>,
}

impl DefaultPluginManager {
    pub fn new(manifests: Arc<dyn ManifestSource>, loader: Arc<dyn ComponentLoader>) -> Self {
        Self {
            name: "DefaultPluginManager",
            registry: Arc::new(RwLock::new(PluginRegistry::new())),
            manifests,
            loader,
            state: None,
            events: None,
        }
    }

    /// Persist the registry snapshot to `store` after every change
    pub fn with_state(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.state = Some(PluginStateStore::new(store));
        self
    }

    /// Publish lifecycle events on `events`
    pub fn with_events(mut self, events: SharedEventDispatcher) -> Self {
        self.events = Some(events);
        self
    }

    pub fn registry(&self) -> &Arc<RwLock<PluginRegistry>> {
        &self.registry
    }

    // The registry lock is only ever held for synchronous sections.
    fn read(&self) -> RwLockReadGuard<'_, PluginRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PluginRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn try_load(&self, plugin_id: &str) -> std::result::Result<(), PluginSystemError> {
        validate_plugin_id(plugin_id)?;
        let already_loaded = self.read().is_loaded(plugin_id);
        if already_loaded {
            return Ok(());
        }

        let metadata = self.manifests.fetch_metadata(plugin_id).await?;
        let (components, routes) = tokio::join!(
            self.loader.load_components(plugin_id),
            self.loader.load_routes(plugin_id)
        );
        let components = components.unwrap_or_else(|e| {
            warn!("Plugin '{}' loads without components: {}", plugin_id, e);
            Vec::new()
        });
        let routes = routes.unwrap_or_else(|e| {
            warn!("Plugin '{}' loads without routes: {}", plugin_id, e);
            Vec::new()
        });

        let plugin = Plugin {
            id: plugin_id.to_string(),
            metadata,
            components,
            routes,
        };
        let inserted = self.write().insert_loaded(plugin)?;
        if inserted {
            info!("Loaded plugin '{}'", plugin_id);
            self.persist();
            self.emit(PluginLifecycleEvent::Loaded {
                plugin_id: plugin_id.to_string(),
            })
            .await;
        }
        Ok(())
    }

    pub async fn try_unload(&self, plugin_id: &str) -> std::result::Result<(), PluginSystemError> {
        let removed = self.write().remove_loaded(plugin_id)?;
        if removed.is_some() {
            info!("Unloaded plugin '{}'", plugin_id);
            self.persist();
            self.emit(PluginLifecycleEvent::Unloaded {
                plugin_id: plugin_id.to_string(),
            })
            .await;
        }
        Ok(())
    }

    pub async fn try_enable(&self, plugin_id: &str) -> std::result::Result<(), PluginSystemError> {
        let (registered, loaded, was_enabled) = {
            let registry = self.read();
            (
                registry.is_registered(plugin_id),
                registry.is_loaded(plugin_id),
                registry.is_enabled(plugin_id),
            )
        };
        if !registered {
            return Err(PluginSystemError::NotRegistered {
                plugin_id: plugin_id.to_string(),
            });
        }
        if was_enabled {
            return Ok(());
        }
        if !loaded {
            self.try_load(plugin_id).await?;
        }

        let changed = self.write().set_enabled(plugin_id, true)?;
        if changed {
            self.persist();
        }
        info!("Enabled plugin '{}'", plugin_id);
        self.emit(PluginLifecycleEvent::Enabled {
            plugin_id: plugin_id.to_string(),
        })
        .await;
        Ok(())
    }

    pub async fn try_disable(&self, plugin_id: &str) -> std::result::Result<(), PluginSystemError> {
        let changed = self.write().set_enabled(plugin_id, false)?;
        if !changed {
            return Ok(());
        }
        info!("Disabled plugin '{}'", plugin_id);
        self.persist();
        self.emit(PluginLifecycleEvent::Disabled {
            plugin_id: plugin_id.to_string(),
        })
        .await;
        Ok(())
    }

    /// Re-register every plugin of the persisted snapshot, then load the ones
    /// persisted as enabled, dependencies first. Returns how many were loaded.
    pub async fn hydrate(&self) -> usize {
        let Some(state) = &self.state else {
            return 0;
        };
        let snapshot = state.load();
        if snapshot.is_empty() {
            return 0;
        }

        {
            let mut registry = self.write();
            for entry in &snapshot {
                if let Err(e) = validate_plugin_id(&entry.id) {
                    warn!("Skipping persisted plugin: {}", e);
                    continue;
                }
                registry.register(Plugin::registered(entry.id.clone(), entry.metadata.clone()));
            }
        }

        let pending: Vec<(String, Vec<String>)> = snapshot
            .iter()
            .filter(|entry| entry.metadata.enabled)
            .map(|entry| (entry.id.clone(), entry.metadata.dependencies.clone()))
            .collect();
        let order = resolve_load_order(&pending);
        if !order.unresolved.is_empty() {
            warn!(
                "Circular dependency between persisted plugins: {}",
                order.unresolved.join(", ")
            );
        }

        let mut loaded = 0;
        for plugin_id in order.ordered.iter().chain(order.unresolved.iter()) {
            match self.try_load(plugin_id).await {
                Ok(()) => loaded += 1,
                Err(e) => self.log_failure("restore", plugin_id, &e),
            }
        }
        debug!("Hydrated {} plugins, loaded {}", snapshot.len(), loaded);
        loaded
    }

    /// Register every plugin the manifest source can list that is not yet
    /// known. Returns the newly registered ids.
    pub async fn discover(&self) -> std::result::Result<Vec<String>, PluginSystemError> {
        let available = self.manifests.available_plugins().await?;
        let mut discovered = Vec::new();
        for plugin_id in available {
            let known = self.read().is_registered(&plugin_id);
            if known {
                continue;
            }
            match self.manifests.fetch_metadata(&plugin_id).await {
                Ok(metadata) => {
                    let registered = self
                        .write()
                        .register(Plugin::registered(plugin_id.clone(), metadata));
                    if registered {
                        discovered.push(plugin_id);
                    }
                }
                Err(e) => self.log_failure("discover", &plugin_id, &e),
            }
        }
        if !discovered.is_empty() {
            info!("Discovered plugins: {}", discovered.join(", "));
            self.persist();
        }
        Ok(discovered)
    }

    fn persist(&self) {
        let Some(state) = &self.state else {
            return;
        };
        let snapshot = self.read().snapshot();
        if let Err(e) = state.save(&snapshot) {
            error!("Failed to persist plugin registry: {}", e);
        }
    }

    async fn emit(&self, event: PluginLifecycleEvent) {
        if let Some(events) = &self.events {
            events.dispatch(&event).await;
        }
    }

    fn log_failure(&self, operation: &str, plugin_id: &str, err: &PluginSystemError) {
        if err.is_io() {
            error!("Failed to {} plugin '{}': {}", operation, plugin_id, err);
        } else {
            warn!("Refused to {} plugin '{}': {}", operation, plugin_id, err);
        }
    }

    fn report(&self, operation: &str, plugin_id: &str, outcome: std::result::Result<(), PluginSystemError>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(e) => {
                self.log_failure(operation, plugin_id, &e);
                false
            }
        }
    }
}

impl fmt::Debug for DefaultPluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPluginManager")
            .field("name", &self.name)
            .field("manifests", &self.manifests.location())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KernelComponent for DefaultPluginManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        self.hydrate().await;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.persist();
        Ok(())
    }
}

#[async_trait]
impl PluginManager for DefaultPluginManager {
    async fn load_plugin(&self, plugin_id: &str) -> bool {
        let outcome = self.try_load(plugin_id).await;
        self.report("load", plugin_id, outcome)
    }

    async fn unload_plugin(&self, plugin_id: &str) -> bool {
        let outcome = self.try_unload(plugin_id).await;
        self.report("unload", plugin_id, outcome)
    }

    async fn enable_plugin(&self, plugin_id: &str) -> bool {
        let outcome = self.try_enable(plugin_id).await;
        self.report("enable", plugin_id, outcome)
    }

    async fn disable_plugin(&self, plugin_id: &str) -> bool {
        let outcome = self.try_disable(plugin_id).await;
        self.report("disable", plugin_id, outcome)
    }

    fn get_plugin(&self, plugin_id: &str) -> Option<Plugin> {
        self.read().get(plugin_id).cloned()
    }

    fn get_component(&self, plugin_id: &str, component_id: &str) -> Option<PluginComponent> {
        self.read().component(plugin_id, component_id).cloned()
    }

    fn get_plugin_routes(&self, plugin_id: &str) -> Vec<PluginRoute> {
        self.read().routes(plugin_id)
    }

    fn get_all_routes(&self) -> Vec<PluginRoute> {
        self.read().enabled_routes()
    }

    fn is_plugin_loaded(&self, plugin_id: &str) -> bool {
        self.read().is_loaded(plugin_id)
    }

    fn is_plugin_enabled(&self, plugin_id: &str) -> bool {
        self.read().is_enabled(plugin_id)
    }

    fn plugins(&self) -> Vec<Plugin> {
        self.read().plugins().into_iter().cloned().collect()
    }

    fn loaded_plugins(&self) -> Vec<String> {
        self.read().loaded_ids().to_vec()
    }

    fn dependents_of(&self, plugin_id: &str) -> Vec<String> {
        self.read().dependents_of(plugin_id)
    }
}
