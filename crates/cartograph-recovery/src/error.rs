//! Error types for the recovery crate.

use thiserror::Error;

/// Why no structured object could be recovered.
///
/// Neither case is fatal: callers treat both as "no usable object".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryError {
    /// The text contains no `{` ... `}` span at all.
    #[error("no structured content found")]
    NoStructuredContent,

    /// A span exists but every repair stage failed.
    #[error("structured content could not be repaired")]
    Unrecoverable,
}

/// Result type for recovery operations.
pub type Result<T> = std::result::Result<T, RecoveryError>;
