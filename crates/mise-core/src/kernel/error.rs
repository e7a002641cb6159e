//! # Mise Core Kernel Errors
//!
//! Defines the aggregate error type of `mise-core`.
//!
//! Every subsystem owns a typed error enum ([`PluginSystemError`],
//! [`StorageSystemError`], [`EventSystemError`], [`OfflineSyncError`]); each
//! converts into [`Error`] so lifecycle code can use a single `Result` alias.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::event::error::EventSystemError;
use crate::offline::error::OfflineSyncError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

/// Custom error type for the Mise core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Event system error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// Offline queue / replay error
    #[error("Offline sync error: {0}")]
    OfflineSync(#[from] OfflineSyncError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelLifecyclePhase {
    Bootstrap,
    Initialize,
    Start,
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wraps an I/O failure with the operation and path it happened on.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    /// Wraps a component failure raised during `phase`.
    pub fn lifecycle(phase: KernelLifecyclePhase, component_name: &str, source: Error) -> Self {
        Error::KernelLifecycleError {
            phase,
            component_name: Some(component_name.to_string()),
            message: format!("component '{}' failed", component_name),
            source: Some(Box::new(source)),
        }
    }
}
