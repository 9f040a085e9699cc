//! Where Scout looks for config layers, and how a layer file is read.

use super::{ConfigLayer, ConfigLayerSource, LayeredConfigOptions, LoadedLayer, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and under `~/.scout`.
pub(super) const CONFIG_FILE_NAME: &str = "scout.json5";

#[cfg(unix)]
const SYSTEM_CONFIG: Option<&str> = Some("/etc/scout/scout.json5");
#[cfg(windows)]
const SYSTEM_CONFIG: Option<&str> = Some("C:\\ProgramData\\scout\\scout.json5");
#[cfg(not(any(unix, windows)))]
const SYSTEM_CONFIG: Option<&str> = None;

pub(super) fn system_config() -> Option<PathBuf> {
    SYSTEM_CONFIG.map(PathBuf::from)
}

pub(super) fn user_config() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(".scout").join(CONFIG_FILE_NAME))
}

/// One file the loader will try, in precedence order.
#[derive(Debug)]
pub(super) struct Candidate {
    pub(super) source: ConfigLayerSource,
    pub(super) path: PathBuf,
    /// Runtime layers were asked for explicitly, so a missing file is an error.
    pub(super) required: bool,
}

/// List candidate layers, low precedence first.
///
/// Discovered layers pointing at the same file (after canonicalization) are
/// kept once, at their lowest-precedence position. Runtime layers are never
/// dropped.
pub(super) fn candidates(options: &LayeredConfigOptions) -> Vec<Candidate> {
    let cwd = options
        .cwd
        .canonicalize()
        .unwrap_or_else(|_| options.cwd.clone());
    let discovered = [
        (ConfigLayerSource::System, options.system_config_path.clone()),
        (ConfigLayerSource::User, options.user_config_path.clone()),
        (ConfigLayerSource::Cwd, Some(cwd.join(CONFIG_FILE_NAME))),
    ];

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (source, path) in discovered {
        let Some(path) = path else { continue };
        if !seen.insert(identity(&path)) {
            debug!("config layer {} repeats {}", source.name(), path.display());
            continue;
        }
        out.push(Candidate {
            source,
            path,
            required: false,
        });
    }
    out.extend(options.runtime_paths.iter().map(|path| Candidate {
        source: ConfigLayerSource::Runtime,
        path: path.clone(),
        required: true,
    }));
    out
}

/// Read, parse and schema-check one candidate.
///
/// Returns `None` for an optional layer whose file does not exist.
pub(super) fn read(candidate: Candidate) -> Result<Option<LoadedLayer>, ConfigError> {
    let Candidate {
        source,
        path,
        required,
    } = candidate;
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound && !required => {
            debug!("no {} config at {}", source.name(), path.display());
            return Ok(None);
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let meta = ConfigLayer {
        source,
        path: Some(path),
    };
    let label = meta.label();
    let value = parse_json5(&text, &label)?;
    schema::validate_layer_schema(&value, &label)?;
    debug!("read config layer {label}");
    Ok(Some(LoadedLayer { meta, value }))
}

pub(super) fn parse_json5(text: &str, origin: &str) -> Result<Value, ConfigError> {
    json5::from_str(text).map_err(|source| ConfigError::Syntax {
        origin: origin.to_string(),
        source,
    })
}

fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
