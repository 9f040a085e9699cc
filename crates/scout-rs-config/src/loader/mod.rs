//! Layered configuration loader.
//!
//! Discovers configuration layers (system/user/cwd/runtime), validates schema,
//! merges them in precedence order, and produces a final `ScoutConfig`.

mod merge;
mod schema;
mod sources;


use crate::{ConfigError, MIN_API_SECRET_LEN, ScoutConfig};
use log::{debug, info};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: ScoutConfig,
    /// Metadata for each layer that contributed to the config.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// System-wide configuration.
    System,
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

impl ConfigLayerSource {
    /// Short lowercase name used in labels and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Cwd => "cwd",
            Self::Runtime => "runtime",
        }
    }
}

/// Metadata about a config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin (system, user, runtime, etc).
    pub source: ConfigLayerSource,
    /// Location on disk if present.
    pub path: Option<PathBuf>,
}

impl ConfigLayer {
    /// `source(path)`, used to prefix schema errors.
    pub fn label(&self) -> String {
        match &self.path {
            Some(path) => format!("{}({})", self.source.name(), path.display()),
            None => self.source.name().to_string(),
        }
    }
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find the cwd layer.
    pub cwd: PathBuf,
    /// Optional system config path (defaults to `/etc/scout/scout.json5` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// Optional user config path (defaults to `~/.scout/scout.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: sources::system_config(),
            user_config_path: sources::user_config(),
            runtime_paths: Vec::new(),
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl ScoutConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        config_from_value(sources::parse_json5(&contents, "config")?, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        config_from_value(sources::parse_json5(contents, "config")?, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations and overrides.
    ///
    /// Layer precedence (low -> high): system, user, cwd, runtime overrides.
    /// A file reachable through several layers is only applied once.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        for candidate in sources::candidates(&options) {
            if let Some(layer) = sources::read(candidate)? {
                merge::merge_json_values(&mut merged, &layer.value);
                layers.push(layer.meta);
            }
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.auth.api_secret
            && secret.chars().count() < MIN_API_SECRET_LEN
        {
            return Err(ConfigError::Rejected(format!(
                "auth.api_secret must be at least {MIN_API_SECRET_LEN} characters"
            )));
        }
        if self.cache.max_records == 0 {
            return Err(ConfigError::Rejected(
                "cache.max_records must be greater than zero".to_string(),
            ));
        }
        if self.cache.refresh_interval_secs == 0 {
            return Err(ConfigError::Rejected(
                "cache.refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Rejected(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        Ok(())
    }

    /// Parsed listen address. Validated configs always succeed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|_| {
            ConfigError::Rejected(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            ))
        })
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<ScoutConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: ScoutConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
