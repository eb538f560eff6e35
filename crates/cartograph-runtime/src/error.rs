//! Error types for the runtime crate.

use thiserror::Error;

use cartograph_client::ClientError;
use cartograph_models::Generation;
use cartograph_stream::StreamError;

/// Errors that abort one scan's pipeline.
///
/// None of these touch the graph currently on display.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// The stream could not be opened or a read failed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service reported an error frame.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A newer scan started before this one finished.
    #[error("scan {0} superseded by a newer scan")]
    Superseded(Generation),

    /// The runtime was shut down.
    #[error("runtime shut down")]
    Shutdown,
}

impl PipelineError {
    /// Returns true if the user should see this as an error rather than
    /// as a quietly abandoned scan.
    pub fn is_failure(&self) -> bool {
        matches!(self, PipelineError::Transport(_) | PipelineError::Upstream(_))
    }
}

impl From<StreamError> for PipelineError {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Transport(message) => PipelineError::Transport(message),
        }
    }
}

impl From<ClientError> for PipelineError {
    fn from(e: ClientError) -> Self {
        PipelineError::Transport(e.to_string())
    }
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
