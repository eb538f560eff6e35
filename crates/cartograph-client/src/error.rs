//! Error types for the client crate.

use thiserror::Error;

/// Errors talking to the analysis service.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint could not be built.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A non-streaming response did not match its expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Request(e.to_string())
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
