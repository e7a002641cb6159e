use std::fmt::Debug;

use async_trait::async_trait;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginMetadata;
use crate::plugin_system::plugin::{PluginComponent, PluginRoute, Props};

/// Something a plugin component or route can draw
pub trait Renderable: Send + Sync + Debug {
    fn render(&self, props: &Props) -> String;
}

/// Where plugin metadata comes from
#[async_trait]
pub trait ManifestSource: Send + Sync + Debug {
    /// Location shown in logs and errors
    fn location(&self) -> String;

    /// Fetch and validate the metadata of one plugin
    async fn fetch_metadata(&self, plugin_id: &str) -> Result<PluginMetadata, PluginSystemError>;

    /// Ids this source can serve without being told about them.
    /// Sources that cannot enumerate their plugins serve none.
    async fn available_plugins(&self) -> Result<Vec<String>, PluginSystemError> {
        Ok(Vec::new())
    }
}

/// Resolves a plugin's renderable components and routes
#[async_trait]
pub trait ComponentLoader: Send + Sync + Debug {
    async fn load_components(&self, plugin_id: &str) -> Result<Vec<PluginComponent>, PluginSystemError>;

    async fn load_routes(&self, plugin_id: &str) -> Result<Vec<PluginRoute>, PluginSystemError>;
}
