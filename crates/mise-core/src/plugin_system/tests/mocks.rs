#![cfg(test)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource, ResourceKind};
use crate::plugin_system::manifest::{MetadataBuilder, PluginMetadata};
use crate::plugin_system::plugin::{PluginComponent, PluginRoute, TemplateView};
use crate::plugin_system::traits::{ComponentLoader, ManifestSource};

/// In-memory manifest source; ids without metadata fail like an unreachable endpoint
#[derive(Debug, Default)]
pub struct MockManifestSource {
    manifests: Mutex<HashMap<String, PluginMetadata>>,
    listed: Vec<String>,
    pub fetches: AtomicUsize,
}

impl MockManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, plugin_id: &str, metadata: PluginMetadata) -> Self {
        self.set(plugin_id, metadata);
        self
    }

    /// Also advertise the plugin through `available_plugins`
    pub fn listed(mut self, plugin_id: &str) -> Self {
        self.listed.push(plugin_id.to_string());
        self
    }

    pub fn set(&self, plugin_id: &str, metadata: PluginMetadata) {
        self.manifests
            .lock()
            .expect("manifests lock")
            .insert(plugin_id.to_string(), metadata);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestSource for MockManifestSource {
    fn location(&self) -> String {
        "mock://manifests".to_string()
    }

    async fn fetch_metadata(&self, plugin_id: &str) -> Result<PluginMetadata, PluginSystemError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let found = self.manifests.lock().expect("manifests lock").get(plugin_id).cloned();
        found.ok_or_else(|| PluginSystemError::MetadataFetch {
            plugin_id: plugin_id.to_string(),
            location: self.location(),
            source: Box::new(PluginSystemErrorSource::Status(404)),
        })
    }

    async fn available_plugins(&self) -> Result<Vec<String>, PluginSystemError> {
        Ok(self.listed.clone())
    }
}

/// Gives every plugin one `widget` component and one `/{id}` route, unless
/// told to fail a category for a plugin.
#[derive(Debug, Default)]
pub struct MockComponentLoader {
    failing_components: HashSet<String>,
    failing_routes: HashSet<String>,
}

impl MockComponentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_components(mut self, plugin_id: &str) -> Self {
        self.failing_components.insert(plugin_id.to_string());
        self
    }

    pub fn failing_routes(mut self, plugin_id: &str) -> Self {
        self.failing_routes.insert(plugin_id.to_string());
        self
    }
}

fn load_failure(plugin_id: &str, kind: ResourceKind) -> PluginSystemError {
    PluginSystemError::ComponentLoad {
        plugin_id: plugin_id.to_string(),
        kind,
        source: Box::new(PluginSystemErrorSource::Other("boom".to_string())),
    }
}

#[async_trait]
impl ComponentLoader for MockComponentLoader {
    async fn load_components(&self, plugin_id: &str) -> Result<Vec<PluginComponent>, PluginSystemError> {
        if self.failing_components.contains(plugin_id) {
            return Err(load_failure(plugin_id, ResourceKind::Components));
        }
        Ok(vec![PluginComponent::new(
            "widget",
            TemplateView::handle(format!("{} widget: {{{{label}}}}", plugin_id)),
        )])
    }

    async fn load_routes(&self, plugin_id: &str) -> Result<Vec<PluginRoute>, PluginSystemError> {
        if self.failing_routes.contains(plugin_id) {
            return Err(load_failure(plugin_id, ResourceKind::Routes));
        }
        Ok(vec![
            PluginRoute::new(format!("/{}", plugin_id), TemplateView::handle(format!("{} home", plugin_id)))
                .exact(true),
        ])
    }
}

pub fn metadata(name: &str, dependencies: &[&str]) -> PluginMetadata {
    dependencies
        .iter()
        .fold(MetadataBuilder::new(name, "1.0.0"), |builder, dep| builder.dependency(dep))
        .build()
}
