//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the export failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The export document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The analysis endpoint is not a usable http(s) URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A numeric setting could not be parsed or is out of range.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
