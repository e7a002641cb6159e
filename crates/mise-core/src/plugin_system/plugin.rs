use std::sync::Arc;

use serde_json::{Map, Value};

use crate::plugin_system::manifest::PluginMetadata;
use crate::plugin_system::traits::Renderable;

/// Properties passed to a renderable
pub type Props = Map<String, Value>;

/// Opaque handle to something renderable
pub type RenderHandle = Arc<dyn Renderable>;

/// Renders a text template, replacing `{{key}}` with the matching prop.
/// String props are inserted as-is, other values as JSON; unknown
/// placeholders are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateView {
    template: String,
}

impl TemplateView {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn handle(template: impl Into<String>) -> RenderHandle {
        Arc::new(Self::new(template))
    }
}

impl Renderable for TemplateView {
    // Single left-to-right scan: substituted values are never re-scanned
    fn render(&self, props: &Props) -> String {
        let mut output = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                rest = &rest[start..];
                break;
            };
            let placeholder = &rest[start..start + 2 + end + 2];
            match props.get(after_open[..end].trim()) {
                Some(Value::String(s)) => output.push_str(s),
                Some(other) => output.push_str(&other.to_string()),
                None => output.push_str(placeholder),
            }
            rest = &after_open[end + 2..];
        }
        output.push_str(rest);
        output
    }
}

#[derive(Debug, Clone)]
pub struct PluginComponent {
    pub id: String,
    pub handle: RenderHandle,
    /// Default props, overridden by the caller's props on render
    pub props: Option<Props>,
}

impl PluginComponent {
    pub fn new(id: impl Into<String>, handle: RenderHandle) -> Self {
        Self { id: id.into(), handle, props: None }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    pub fn render(&self, props: &Props) -> String {
        match &self.props {
            Some(defaults) => {
                let mut merged = defaults.clone();
                merged.extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
                self.handle.render(&merged)
            }
            None => self.handle.render(props),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PluginRoute {
    pub path: String,
    pub handle: RenderHandle,
    pub exact: bool,
    /// Permissions a caller needs to reach this route
    pub permissions: Vec<String>,
}

impl PluginRoute {
    pub fn new(path: impl Into<String>, handle: RenderHandle) -> Self {
        Self {
            path: path.into(),
            handle,
            exact: false,
            permissions: Vec::new(),
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }
}

/// A registry entry: metadata plus the frontend pieces contributed by the plugin.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub id: String,
    pub metadata: PluginMetadata,
    pub components: Vec<PluginComponent>,
    pub routes: Vec<PluginRoute>,
}

impl Plugin {
    /// An entry known from persisted state or discovery, with nothing loaded yet
    pub fn registered(id: impl Into<String>, metadata: PluginMetadata) -> Self {
        Self {
            id: id.into(),
            metadata,
            components: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn component(&self, component_id: &str) -> Option<&PluginComponent> {
        self.components.iter().find(|c| c.id == component_id)
    }
}
