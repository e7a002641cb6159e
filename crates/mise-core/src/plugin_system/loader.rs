use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource, ResourceKind};
use crate::plugin_system::manifest::{PluginMetadata, validate_plugin_id};
use crate::plugin_system::plugin::{PluginComponent, PluginRoute, Props, TemplateView};
use crate::plugin_system::traits::{ComponentLoader, ManifestSource};

const MANIFEST_PATH: &str = "config/plugin.json";
const COMPONENTS_PATH: &str = "frontend/components.json";
const ROUTES_PATH: &str = "frontend/routes.json";

//--------------------------------------------------
// Manifest sources
//--------------------------------------------------

/// Fetches `GET {base_url}/{id}/config/plugin.json`
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpManifestSource {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn manifest_url(&self, plugin_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, plugin_id, MANIFEST_PATH)
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    fn location(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_metadata(&self, plugin_id: &str) -> Result<PluginMetadata, PluginSystemError> {
        validate_plugin_id(plugin_id)?;
        let url = self.manifest_url(plugin_id);
        let fetch_error = |source: PluginSystemErrorSource| PluginSystemError::MetadataFetch {
            plugin_id: plugin_id.to_string(),
            location: url.clone(),
            source: Box::new(source),
        };

        debug!("Fetching plugin metadata from {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.into()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(PluginSystemErrorSource::Status(status.as_u16())));
        }
        let body = response.text().await.map_err(|e| fetch_error(e.into()))?;
        PluginMetadata::from_json(plugin_id, &body)
    }
}

/// Reads `{root}/{id}/config/plugin.json` from disk
#[derive(Debug, Clone)]
pub struct FsManifestSource {
    root: PathBuf,
}

impl FsManifestSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ManifestSource for FsManifestSource {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch_metadata(&self, plugin_id: &str) -> Result<PluginMetadata, PluginSystemError> {
        validate_plugin_id(plugin_id)?;
        let path = self.root.join(plugin_id).join(MANIFEST_PATH);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PluginSystemError::MetadataFetch {
                plugin_id: plugin_id.to_string(),
                location: path.display().to_string(),
                source: Box::new(e.into()),
            })?;
        PluginMetadata::from_json(plugin_id, &raw)
    }

    /// Every subdirectory holding a `config/plugin.json`, sorted by id
    async fn available_plugins(&self) -> Result<Vec<String>, PluginSystemError> {
        let discovery_error = |e: std::io::Error| PluginSystemError::Discovery {
            location: self.location(),
            source: Box::new(e.into()),
        };

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(discovery_error)?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(discovery_error)? {
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_plugin_id(&id).is_err() {
                continue;
            }
            let manifest = entry.path().join(MANIFEST_PATH);
            if tokio::fs::try_exists(&manifest).await.unwrap_or(false) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

//--------------------------------------------------
// Component loaders
//--------------------------------------------------

/// Components and routes registered for one plugin
#[derive(Debug, Clone, Default)]
pub struct PluginBundle {
    pub components: Vec<PluginComponent>,
    pub routes: Vec<PluginRoute>,
}

impl PluginBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(mut self, component: PluginComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn route(mut self, route: PluginRoute) -> Self {
        self.routes.push(route);
        self
    }
}

/// Table of bundles compiled into the host. A plugin without an entry
/// contributes no components or routes.
#[derive(Debug, Clone, Default)]
pub struct StaticComponentLoader {
    bundles: HashMap<String, PluginBundle>,
}

impl StaticComponentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, plugin_id: &str, bundle: PluginBundle) -> Self {
        self.register(plugin_id, bundle);
        self
    }

    pub fn register(&mut self, plugin_id: &str, bundle: PluginBundle) {
        self.bundles.insert(plugin_id.to_string(), bundle);
    }
}

#[async_trait]
impl ComponentLoader for StaticComponentLoader {
    async fn load_components(&self, plugin_id: &str) -> Result<Vec<PluginComponent>, PluginSystemError> {
        Ok(self
            .bundles
            .get(plugin_id)
            .map(|bundle| bundle.components.clone())
            .unwrap_or_default())
    }

    async fn load_routes(&self, plugin_id: &str) -> Result<Vec<PluginRoute>, PluginSystemError> {
        Ok(self
            .bundles
            .get(plugin_id)
            .map(|bundle| bundle.routes.clone())
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct ComponentDescriptor {
    id: String,
    template: String,
    #[serde(default)]
    props: Option<Props>,
}

#[derive(Debug, Deserialize)]
struct RouteDescriptor {
    path: String,
    template: String,
    #[serde(default)]
    exact: bool,
    #[serde(default)]
    permissions: Vec<String>,
}

/// Reads `{root}/{id}/frontend/components.json` and `frontend/routes.json`
/// into [`TemplateView`] handles. A missing file means the plugin has none.
#[derive(Debug, Clone)]
pub struct FsComponentLoader {
    root: PathBuf,
}

impl FsComponentLoader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    async fn read_descriptors<T: serde::de::DeserializeOwned>(
        &self,
        plugin_id: &str,
        kind: ResourceKind,
        relative: &str,
    ) -> Result<Vec<T>, PluginSystemError> {
        validate_plugin_id(plugin_id)?;
        let load_error = |source: PluginSystemErrorSource| PluginSystemError::ComponentLoad {
            plugin_id: plugin_id.to_string(),
            kind,
            source: Box::new(source),
        };

        let path = self.root.join(plugin_id).join(relative);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(load_error(e.into())),
        };
        serde_json::from_str(&raw).map_err(|e| load_error(e.into()))
    }
}

#[async_trait]
impl ComponentLoader for FsComponentLoader {
    async fn load_components(&self, plugin_id: &str) -> Result<Vec<PluginComponent>, PluginSystemError> {
        let descriptors: Vec<ComponentDescriptor> = self
            .read_descriptors(plugin_id, ResourceKind::Components, COMPONENTS_PATH)
            .await?;
        Ok(descriptors
            .into_iter()
            .map(|d| PluginComponent {
                id: d.id,
                handle: TemplateView::handle(d.template),
                props: d.props,
            })
            .collect())
    }

    async fn load_routes(&self, plugin_id: &str) -> Result<Vec<PluginRoute>, PluginSystemError> {
        let descriptors: Vec<RouteDescriptor> = self
            .read_descriptors(plugin_id, ResourceKind::Routes, ROUTES_PATH)
            .await?;
        Ok(descriptors
            .into_iter()
            .map(|d| PluginRoute {
                path: d.path,
                handle: TemplateView::handle(d.template),
                exact: d.exact,
                permissions: d.permissions,
            })
            .collect())
    }
}
