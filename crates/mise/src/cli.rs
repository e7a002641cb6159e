use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use mise_core::Application;
use mise_core::offline::Operation;
use mise_core::plugin_system::{ComponentRenderer, PluginManager, Props, RenderOutcome, RouteRenderer};

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Mise: plugin host and offline mutation queue
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (.json, .toml, .yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for persisted state, overrides the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Plugin source: a directory or an http(s) base URL
    #[arg(long, global = true)]
    pub plugins: Option<String>,

    /// Base URL of the REST API offline mutations are replayed against
    #[arg(long, global = true)]
    pub api: Option<String>,

    /// Print "pong" and exit
    #[arg(long)]
    pub ping: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Inspect and replay the offline mutation queue
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },
    /// Read and write the offline read cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// List registered plugins
    List,
    /// Register every plugin the source offers
    Discover,
    /// Load a plugin whose dependencies are loaded
    Load { id: String },
    /// Unload a plugin nothing depends on
    Unload { id: String },
    /// Enable a plugin, loading it first if needed
    Enable { id: String },
    /// Disable a plugin without unloading it
    Disable { id: String },
    /// Routes of one plugin, or of every enabled plugin
    Routes { id: Option<String> },
    /// Render a component (or a route with --route)
    Render {
        id: String,
        /// Component id, or route path with --route
        target: String,
        #[arg(long)]
        route: bool,
        /// JSON object of props
        #[arg(long)]
        props: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueueCommand {
    /// Queue a mutation: create, update or delete
    Add {
        collection: String,
        operation: String,
        /// JSON payload
        payload: String,
    },
    /// Print queued mutations
    List,
    /// Replay every queued mutation once
    Replay,
    /// Drop expired cache entries and stale mutations
    Cleanup,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Cache a JSON value under collection/key
    Put {
        collection: String,
        key: String,
        data: String,
    },
    /// Print a cached entry, or the whole collection without a key
    Get { collection: String, key: Option<String> },
}

pub async fn execute(app: &Application, command: Commands) -> CommandResult {
    match command {
        Commands::Plugin { command } => plugin(app, command).await,
        Commands::Queue { command } => queue(app, command).await,
        Commands::Cache { command } => cache(app, command).await,
    }
}

/// One-line status for a bare invocation
pub fn summary(app: &Application) -> String {
    let plugins = app.plugin_manager();
    format!(
        "{} plugins registered, {} loaded, {} queued mutations",
        plugins.plugins().len(),
        plugins.loaded_plugins().len(),
        app.offline().pending().len()
    )
}

async fn plugin(app: &Application, command: PluginCommand) -> CommandResult {
    let manager = app.plugin_manager();
    match command {
        PluginCommand::List => {
            let plugins = manager.plugins();
            if plugins.is_empty() {
                println!("No plugins registered");
            }
            for plugin in plugins {
                let loaded = if manager.is_plugin_loaded(&plugin.id) { "loaded" } else { "registered" };
                let enabled = if manager.is_plugin_enabled(&plugin.id) { "enabled" } else { "disabled" };
                println!(
                    "{}\t{} {}\t{}, {}",
                    plugin.id, plugin.metadata.name, plugin.metadata.version, loaded, enabled
                );
            }
        }
        PluginCommand::Discover => {
            let discovered = manager.discover().await?;
            if discovered.is_empty() {
                println!("No new plugins");
            }
            for id in discovered {
                println!("Discovered {}", id);
            }
        }
        PluginCommand::Load { id } => {
            manager.try_load(&id).await?;
            println!("Loaded {}", id);
        }
        PluginCommand::Unload { id } => {
            manager.try_unload(&id).await?;
            println!("Unloaded {}", id);
        }
        PluginCommand::Enable { id } => {
            manager.try_enable(&id).await?;
            println!("Enabled {}", id);
        }
        PluginCommand::Disable { id } => {
            manager.try_disable(&id).await?;
            println!("Disabled {}", id);
        }
        PluginCommand::Routes { id } => {
            let routes = match id {
                Some(id) => manager.get_plugin_routes(&id),
                None => manager.get_all_routes(),
            };
            for route in routes {
                let exact = if route.exact { " (exact)" } else { "" };
                println!("{}{}", route.path, exact);
            }
        }
        PluginCommand::Render {
            id,
            target,
            route,
            props,
        } => {
            let props = parse_props(props.as_deref())?;
            let outcome = if route {
                RouteRenderer::new(&*manager).render(&id, &target, &props)
            } else {
                ComponentRenderer::new(&*manager).render(&id, &target, &props)
            };
            match outcome {
                RenderOutcome::Rendered(output) => println!("{}", output),
                RenderOutcome::Disabled { plugin_id } => {
                    return Err(format!("plugin '{}' is not enabled", plugin_id).into());
                }
                RenderOutcome::ComponentNotFound {
                    plugin_id,
                    component_id,
                } => {
                    return Err(format!("plugin '{}' has no component '{}'", plugin_id, component_id).into());
                }
                RenderOutcome::RouteNotFound { plugin_id, path } => {
                    return Err(format!("plugin '{}' has no route '{}'", plugin_id, path).into());
                }
            }
        }
    }
    Ok(())
}

async fn queue(app: &Application, command: QueueCommand) -> CommandResult {
    let sync = app.offline();
    match command {
        QueueCommand::Add {
            collection,
            operation,
            payload,
        } => {
            let operation: Operation = operation.parse()?;
            let payload: Value = serde_json::from_str(&payload)?;
            let id = sync.enqueue(&collection, operation, payload).await?;
            println!("{}", id);
        }
        QueueCommand::List => {
            println!("{}", serde_json::to_string_pretty(&sync.pending())?);
        }
        QueueCommand::Replay => {
            let result = sync.replay_all().await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                return Err(result.errors.join("; ").into());
            }
        }
        QueueCommand::Cleanup => {
            let report = sync.cleanup().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

async fn cache(app: &Application, command: CacheCommand) -> CommandResult {
    let sync = app.offline();
    match command {
        CacheCommand::Put { collection, key, data } => {
            let data: Value = serde_json::from_str(&data)?;
            let entry = sync.cache_data(&collection, &key, data).await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        CacheCommand::Get {
            collection,
            key: Some(key),
        } => {
            let entry = sync
                .cached(&collection, &key)
                .ok_or_else(|| format!("nothing cached for {}/{}", collection, key))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        CacheCommand::Get { collection, key: None } => {
            println!("{}", serde_json::to_string_pretty(&sync.cached_collection(&collection))?);
        }
    }
    Ok(())
}

fn parse_props(raw: Option<&str>) -> Result<Props, Box<dyn Error>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str(raw)? {
            Value::Object(props) => Ok(props),
            _ => Err("--props must be a JSON object".into()),
        },
    }
}
