use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

use crate::event::SharedEventDispatcher;
use crate::kernel::component::{ComponentRegistry, KernelComponent};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::offline::{ConnectivityMonitor, HttpRemoteApi, OfflineManager, OfflineSync, RemoteApi};
use crate::plugin_system::{
    ComponentLoader, DefaultPluginManager, FsComponentLoader, FsManifestSource, HttpManifestSource,
    ManifestSource, StaticComponentLoader,
};
use crate::storage::{AppConfig, FileKeyValueStore, KeyValueStore, PluginSourceKind};

/// Main application struct wiring the store, event bus, plugin manager and
/// offline sync together and driving their lifecycle.
#[derive(Debug)]
pub struct Application {
    config: AppConfig,
    events: SharedEventDispatcher,
    plugin_manager: Arc<DefaultPluginManager>,
    offline_manager: Arc<OfflineManager>,
    components: ComponentRegistry,
    initialized: bool,
}

impl Application {
    /// Build every component from `config`: a file store under the resolved
    /// data directory, an HTTP remote API and the configured plugin source.
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let data_dir = config.resolve_data_dir();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(data_dir.clone())?);
        info!("Using data directory: {}", data_dir.display());

        let client = HttpRemoteApi::client(Duration::from_secs(config.api.timeout_secs))?;
        let remote = Arc::new(HttpRemoteApi::new(config.api.base_url.clone(), client.clone()));

        let (manifests, loader): (Arc<dyn ManifestSource>, Arc<dyn ComponentLoader>) =
            match config.plugins_source() {
                PluginSourceKind::Http(base_url) => (
                    Arc::new(HttpManifestSource::new(base_url, client)),
                    Arc::new(StaticComponentLoader::new()),
                ),
                PluginSourceKind::Directory(root) => (
                    Arc::new(FsManifestSource::new(root.clone())),
                    Arc::new(FsComponentLoader::new(root)),
                ),
            };

        Ok(Self::with_parts(config, store, manifests, loader, remote))
    }

    /// Build the application around caller-supplied collaborators.
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        manifests: Arc<dyn ManifestSource>,
        loader: Arc<dyn ComponentLoader>,
        remote: Arc<dyn RemoteApi>,
    ) -> Self {
        let events = SharedEventDispatcher::new();

        let plugin_manager = Arc::new(
            DefaultPluginManager::new(manifests, loader)
                .with_state(store.clone())
                .with_events(events.clone()),
        );

        let sync = Arc::new(OfflineSync::new(store, remote, events.clone()));
        let monitor = ConnectivityMonitor::new(config.offline.start_online);
        let offline_manager = Arc::new(OfflineManager::new(sync, monitor, &config.offline));

        // Registration order is lifecycle order
        let mut components = ComponentRegistry::new();
        components.register_instance(plugin_manager.clone());
        components.register_instance(offline_manager.clone());

        Self {
            config,
            events,
            plugin_manager,
            offline_manager,
            components,
            initialized: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &SharedEventDispatcher {
        &self.events
    }

    pub fn plugin_manager(&self) -> Arc<DefaultPluginManager> {
        self.plugin_manager.clone()
    }

    pub fn offline_manager(&self) -> Arc<OfflineManager> {
        self.offline_manager.clone()
    }

    /// Shortcut for the offline sync service
    pub fn offline(&self) -> Arc<OfflineSync> {
        self.offline_manager.sync().clone()
    }

    /// Gets a specific component instance by its concrete type T.
    pub fn get_component<T: KernelComponent + 'static>(&self) -> Option<Arc<T>> {
        self.components.get_concrete::<T>()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize then start every component.
    pub async fn run(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Bootstrap,
                component_name: None,
                message: "Application already running".to_string(),
                source: None,
            });
        }
        self.initialize().await?;
        self.start().await?;
        self.initialized = true;
        info!("Application initialized and started");
        Ok(())
    }

    /// Initialize all registered components in registration order.
    pub async fn initialize(&self) -> Result<()> {
        for component in self.components.components() {
            info!("Initializing component: {}", component.name());
            component
                .initialize()
                .await
                .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Initialize, component.name(), e))?;
        }
        Ok(())
    }

    /// Start all components in registration order.
    pub async fn start(&self) -> Result<()> {
        for component in self.components.components() {
            info!("Starting component: {}", component.name());
            component
                .start()
                .await
                .map_err(|e| Error::lifecycle(KernelLifecyclePhase::Start, component.name(), e))?;
        }
        Ok(())
    }

    /// Stop all components in reverse order. Every component is stopped even
    /// if an earlier one fails; the first failure is returned.
    pub async fn shutdown(&mut self) -> Result<()> {
        let mut first_error = None;
        for component in self.components.components().iter().rev() {
            info!("Stopping component: {}", component.name());
            if let Err(e) = component.stop().await {
                error!("Error stopping component {}: {}", component.name(), e);
                if first_error.is_none() {
                    first_error = Some(Error::lifecycle(KernelLifecyclePhase::Shutdown, component.name(), e));
                }
            }
        }
        self.initialized = false;
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
