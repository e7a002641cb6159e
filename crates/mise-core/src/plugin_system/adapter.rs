use crate::plugin_system::manager::PluginManager;
use crate::plugin_system::plugin::Props;

/// What a renderer produced for a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(String),
    /// The plugin is not loaded and enabled; callers show a fallback
    Disabled { plugin_id: String },
    ComponentNotFound { plugin_id: String, component_id: String },
    RouteNotFound { plugin_id: String, path: String },
}

impl RenderOutcome {
    pub fn rendered(&self) -> Option<&str> {
        match self {
            RenderOutcome::Rendered(output) => Some(output),
            _ => None,
        }
    }
}

/// Renders one named component of a plugin, only while the plugin is enabled
pub struct ComponentRenderer<'a> {
    manager: &'a dyn PluginManager,
}

impl<'a> ComponentRenderer<'a> {
    pub fn new(manager: &'a dyn PluginManager) -> Self {
        Self { manager }
    }

    pub fn render(&self, plugin_id: &str, component_id: &str, props: &Props) -> RenderOutcome {
        if !self.manager.is_plugin_enabled(plugin_id) {
            return RenderOutcome::Disabled {
                plugin_id: plugin_id.to_string(),
            };
        }
        match self.manager.get_component(plugin_id, component_id) {
            Some(component) => RenderOutcome::Rendered(component.render(props)),
            None => RenderOutcome::ComponentNotFound {
                plugin_id: plugin_id.to_string(),
                component_id: component_id.to_string(),
            },
        }
    }
}

/// Renders the route of a plugin whose path equals the requested path
pub struct RouteRenderer<'a> {
    manager: &'a dyn PluginManager,
}

impl<'a> RouteRenderer<'a> {
    pub fn new(manager: &'a dyn PluginManager) -> Self {
        Self { manager }
    }

    pub fn render(&self, plugin_id: &str, path: &str, props: &Props) -> RenderOutcome {
        if !self.manager.is_plugin_enabled(plugin_id) {
            return RenderOutcome::Disabled {
                plugin_id: plugin_id.to_string(),
            };
        }
        let routes = self.manager.get_plugin_routes(plugin_id);
        match routes.iter().find(|route| route.path == path) {
            Some(route) => RenderOutcome::Rendered(route.handle.render(props)),
            None => RenderOutcome::RouteNotFound {
                plugin_id: plugin_id.to_string(),
                path: path.to_string(),
            },
        }
    }
}
