//! Error types for the stream crate.

use thiserror::Error;

/// Errors that abort decoding of a stream.
///
/// Per-frame corruption never surfaces here; it is dropped by the decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Reading from the underlying transport failed.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
