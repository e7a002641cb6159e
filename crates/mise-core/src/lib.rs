pub mod event;
pub mod kernel;
pub mod offline;
pub mod plugin_system;
pub mod storage;

// Re-export key public types for the binary and embedding applications
pub use kernel::Application;
pub use kernel::error::Error as KernelError;
pub use plugin_system::{DefaultPluginManager, Plugin, PluginManager, PluginMetadata};
pub use offline::{OfflineData, OfflineManager, OfflineSync, Operation, SyncResult};
pub use event::{Event, SharedEventDispatcher};
pub use storage::{AppConfig, KeyValueStore};
