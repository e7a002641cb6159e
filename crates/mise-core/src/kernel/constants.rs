/// Application name
pub const APP_NAME: &str = "Mise";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name used under the platform data directory
pub const DATA_DIR_NAME: &str = "mise";

/// Default plugins directory (relative to the working directory)
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Default base URL of the remote REST API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Default HTTP request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default interval between automatic replay attempts
pub const DEFAULT_REPLAY_INTERVAL_SECS: u64 = 30;

/// Replay attempts after which a queued mutation is dropped
pub const MAX_RETRY_COUNT: u32 = 3;

/// Cached reads expire after 24 hours
pub const CACHE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Queued mutations are garbage-collected after 7 days
pub const OFFLINE_DATA_MAX_AGE_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Version tag written on every cache entry
pub const CACHE_VERSION: &str = "1.0";

/// Persisted key holding the pending mutation queue
pub const OFFLINE_DATA_KEY: &str = "offline_data";

/// Persisted key holding the read-through cache
pub const CACHED_DATA_KEY: &str = "cached_data";

/// Persisted key holding the plugin registry snapshot
pub const PLUGIN_REGISTRY_KEY: &str = "plugin_registry";
