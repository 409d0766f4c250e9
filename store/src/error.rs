//! Error types for store and client operations.
//!
//! Transport failures are surfaced to the caller unchanged; nothing in this
//! crate retries.

use graveyard_schema_core::GenerateError;
use thiserror::Error;

/// Errors that can occur while talking to a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Schema generation failed before anything was sent.
    #[error("schema generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The store rejected a schema as structurally invalid.
    #[error("invalid schema {name}: {reason}")]
    InvalidSchema { name: String, reason: String },

    /// No schema is registered under the requested name.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The call's deadline passed before it completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled a streaming read.
    #[error("stream cancelled")]
    Cancelled,

    /// The client was closed; no further calls are possible.
    #[error("client is closed")]
    Closed,

    /// The store failed internally.
    #[error("internal store error: {0}")]
    Internal(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
