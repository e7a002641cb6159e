//! # Mise Core Plugin System
//!
//! Registry and lifecycle management for feature plugins.
//!
//! A plugin is identified by a string id, described by [`PluginMetadata`]
//! (fetched from a [`ManifestSource`]) and contributes renderable components
//! and routes (fetched from a [`ComponentLoader`]). The [`DefaultPluginManager`]
//! enforces load order through declared dependencies, refuses to unload a
//! plugin other loaded plugins depend on, gates route exposure on the enabled
//! flag, and persists a registry snapshot so enabled plugins are reloaded on
//! the next start.
pub mod adapter;
pub mod dependency;
pub mod error;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod plugin;
pub mod registry;
pub mod state;
pub mod traits;

pub use adapter::{ComponentRenderer, RenderOutcome, RouteRenderer};
pub use dependency::{DependencyError, LoadOrder};
pub use error::{PluginSystemError, PluginSystemErrorSource, ResourceKind};
pub use loader::{FsComponentLoader, FsManifestSource, HttpManifestSource, PluginBundle, StaticComponentLoader};
pub use manager::{DefaultPluginManager, PluginManager};
pub use manifest::{MetadataBuilder, PluginMetadata};
pub use plugin::{Plugin, PluginComponent, PluginRoute, Props, RenderHandle, TemplateView};
pub use registry::PluginRegistry;
pub use state::{PersistedPlugin, PluginStateStore};
pub use traits::{ComponentLoader, ManifestSource, Renderable};

#[cfg(test)]
mod tests;
