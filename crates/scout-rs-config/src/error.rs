//! Errors raised while assembling Scout's configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer file could not be read. Missing runtime layers land here too.
    #[error("cannot read config layer {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Layer text is not JSON5.
    #[error("{origin} is not valid JSON5: {source}")]
    Syntax {
        origin: String,
        #[source]
        source: json5::Error,
    },
    /// The merged document passed schema checks but did not deserialize.
    #[error("config does not fit the expected shape: {0}")]
    Decode(#[from] serde_json::Error),
    /// A field in a named layer has the wrong type or is unknown.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A cross-field rule such as the API secret length failed.
    #[error("config rejected: {0}")]
    Rejected(String),
}
