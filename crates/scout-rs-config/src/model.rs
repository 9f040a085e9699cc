//! Configuration schema for Scout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root config for the Scout server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScoutConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl ScoutConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ScoutConfigBuilder {
        ScoutConfigBuilder::new()
    }
}

/// Builder for assembling a `ScoutConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ScoutConfigBuilder {
    config: ScoutConfig,
}

impl ScoutConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ScoutConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the runtime settings.
    pub fn settings(mut self, settings: SettingsConfig) -> Self {
        self.config.settings = settings;
        self
    }

    /// Replace the authorization configuration.
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    /// Replace the storage configuration.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Replace the cache configuration.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    /// Finalize the builder into a config value.
    pub fn build(self) -> ScoutConfig {
        self.config
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// When false only read routes are mounted.
    #[serde(default = "default_true")]
    pub api_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_enabled: true,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:1337".to_string()
}

fn default_true() -> bool {
    true
}

/// Behavior toggles read by the query routers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsConfig {
    /// Rewrite `created_at` into the record's own `utcOffset` on output.
    #[serde(default)]
    pub de_normalize_dates: bool,
}

/// Credentials and permission grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared admin secret; grants every permission.
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Permission patterns granted to every caller.
    #[serde(default = "default_roles")]
    pub default_roles: Vec<String>,
    /// Access token to granted permission patterns.
    #[serde(default)]
    pub tokens: BTreeMap<String, Vec<String>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_secret: None,
            default_roles: default_roles(),
            tokens: BTreeMap::new(),
        }
    }
}

fn default_roles() -> Vec<String> {
    vec!["api:*:read".to_string()]
}

/// Minimum accepted `api_secret` length.
pub const MIN_API_SECRET_LEN: usize = 12;

/// Document store location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory holding JSONL collections; in-memory when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Device status snapshot cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of most recent records kept in the snapshot.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_records: default_max_records(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_max_records() -> usize {
    100
}

fn default_refresh_interval_secs() -> u64 {
    60
}
