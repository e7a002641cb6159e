use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::constants::{
    DATA_DIR_NAME, DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PLUGINS_DIR,
    DEFAULT_REPLAY_INTERVAL_SECS,
};
use crate::storage::error::{StorageResult, StorageSystemError};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Where plugin manifests and frontend bundles are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSourceKind {
    /// Remote `{base}/{id}/config/plugin.json`
    Http(String),
    /// Local `{dir}/{id}/config/plugin.json`
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Either an `http(s)://` base URL or a directory path
    pub source: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_PLUGINS_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Spawn the periodic replay task on `start`
    pub auto_replay: bool,
    pub replay_interval_secs: u64,
    /// Initial connectivity state reported by the monitor
    pub start_online: bool,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            auto_replay: true,
            replay_interval_secs: DEFAULT_REPLAY_INTERVAL_SECS,
            start_online: true,
        }
    }
}

/// Application configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for the persisted key-value files
    pub data_dir: Option<PathBuf>,
    pub plugins: PluginsConfig,
    pub api: ApiConfig,
    pub offline: OfflineConfig,
}

impl AppConfig {
    /// Load configuration from a file, picking the format from its extension.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let data = std::fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_config", path.to_path_buf()))?;
        Self::parse(&data, format)
    }

    /// Parse configuration text in the given format
    pub fn parse(data: &str, format: ConfigFormat) -> StorageResult<Self> {
        let deserialization_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::DeserializationError {
                format: format.extension().to_string(),
                source,
            }
        };
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(data).map_err(|e| deserialization_error(Box::new(e)))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(data).map_err(|e| deserialization_error(Box::new(e)))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization_error(Box::new(e))),
        }
    }

    /// The configured data directory, or the per-user default.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        default_data_dir(
            std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
    }

    pub fn plugins_source(&self) -> PluginSourceKind {
        let source = self.plugins.source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            PluginSourceKind::Http(source.trim_end_matches('/').to_string())
        } else {
            PluginSourceKind::Directory(PathBuf::from(source))
        }
    }
}

/// `$XDG_DATA_HOME/mise`, else `$HOME/.local/share/mise`, else `./.mise`.
pub fn default_data_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.as_os_str().is_empty() => xdg.join(DATA_DIR_NAME),
        (_, Some(home)) => home.join(".local").join("share").join(DATA_DIR_NAME),
        _ => PathBuf::from(format!(".{}", DATA_DIR_NAME)),
    }
}
