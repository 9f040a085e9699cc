//! Error types for the core routing crate.

use scout_rs_store::StoreError;
use thiserror::Error;

/// Errors returned by router and authorization operations.
#[derive(Debug, Error)]
pub enum ScoutCoreError {
    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    /// The caller lacks a required permission.
    #[error("missing permission {permission}")]
    Unauthorized { permission: String },
    /// A configured permission pattern could not be compiled.
    #[error("invalid permission pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}
