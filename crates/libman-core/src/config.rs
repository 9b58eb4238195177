//! Centralized configuration for the library manager.
//!
//! Store slot names, UI routes, cache bounds and timing constants live here so
//! handlers and front ends agree on them.

use std::time::Duration;

/// Names of the store slots written by the handlers.
pub struct StoreKeys;

impl StoreKeys {
    pub const LIB_STATS: &'static str = "libStats";
    pub const LIB_SEARCH: &'static str = "libSearch";
    pub const LIB_DATA: &'static str = "libData";
    pub const LIB_BUILTIN: &'static str = "libBuiltin";
    pub const REGISTRY_PLATFORMS: &'static str = "registryPlatforms";
    pub const REGISTRY_FRAMEWORKS: &'static str = "registryFrameworks";

    /// Prefix for per-storage installed library lists.
    pub const INSTALLED_LIBS_PREFIX: &'static str = "installedLibs";
    /// Prefix for per-storage update lists.
    pub const LIB_UPDATES_PREFIX: &'static str = "libUpdates";

    /// Slot name for a per-storage list, e.g. `installedLibs/global`.
    pub fn per_storage(prefix: &str, storage_key: &str) -> String {
        format!("{}{}", prefix, storage_key)
    }
}

/// UI routes the handlers badge or navigate to.
pub struct RouteConfig;

impl RouteConfig {
    pub const LIBRARY_UPDATES: &'static str = "/libraries/updates";
    pub const LIBRARY_INSTALLED: &'static str = "/libraries/installed";
}

/// Bounds and lifetimes for cached results.
pub struct CacheConfig;

impl CacheConfig {
    pub const MAX_LIST_ENTRIES: usize = 10;
    pub const STATS_RESET_DELAY: Duration = Duration::from_secs(3600);
}

/// Persistent UI state.
pub struct StateConfig;

impl StateConfig {
    pub const LAST_CHECK_UPDATES_KEY: &'static str = "libraries.lastCheckUpdates";
    pub const AUTO_CHECK_INTERVAL: Duration = Duration::from_secs(3 * 24 * 3600);
    pub const DATA_DIR_NAME: &'static str = "libman";
    pub const DB_FILE_NAME: &'static str = "state.db";
    pub const BUSY_TIMEOUT_MS: u32 = 5000;
}

/// Backend transport settings.
pub struct NetworkConfig;

impl NetworkConfig {
    /// JSON-RPC method that runs a backend CLI command.
    pub const CORE_CALL_METHOD: &'static str = "core.call";
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Installs compile nothing but can download for a long time.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
    pub const USER_AGENT: &'static str = "libman";
}

/// Runtime-tunable orchestration settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long `libStats` stays cached before being reset.
    pub stats_reset_delay: Duration,
    /// Minimum time between background update checks.
    pub auto_check_interval: Duration,
    /// Cap for the bounded search/data lists.
    pub max_list_entries: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            stats_reset_delay: CacheConfig::STATS_RESET_DELAY,
            auto_check_interval: StateConfig::AUTO_CHECK_INTERVAL,
            max_list_entries: CacheConfig::MAX_LIST_ENTRIES,
        }
    }
}
