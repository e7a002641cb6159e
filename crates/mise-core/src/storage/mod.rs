//! # Mise Core Storage
//!
//! Durable key-value storage and application configuration.
//!
//! - [`KeyValueStore`]: the injected storage port (`get`/`set`/`delete`).
//! - [`FileKeyValueStore`]: one file per key, atomic replace-on-write.
//! - [`MemoryKeyValueStore`]: process-local store for tests and ephemeral sessions.
//! - [`PersistedCollection`]: a JSON array stored under one key, with every
//!   read-modify-write serialized behind a single writer lock.
//! - [`AppConfig`]: typed configuration loaded from JSON, TOML or YAML.
pub mod collection;
pub mod config;
pub mod error;
pub mod local;
pub mod memory;
pub mod provider;

pub use collection::PersistedCollection;
pub use config::{AppConfig, ConfigFormat, PluginSourceKind};
pub use error::{StorageResult, StorageSystemError};
pub use local::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use provider::KeyValueStore;

#[cfg(test)]
mod tests;
