//! Error types for storage operations.

/// Errors returned by record stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A stored or submitted document was not a JSON object.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// The query could not be interpreted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}
