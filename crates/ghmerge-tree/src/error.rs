//! Error types for tree fingerprinting.

use thiserror::Error;

/// Errors from fingerprinting a tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The underlying git operation or batch channel failed.
    #[error(transparent)]
    Git(#[from] ghmerge_git::GitError),

    /// The batch channel answered for a different object than was
    /// requested. Strict request/response ordering was violated.
    #[error("batch reply out of order: requested {requested}, got {answered}")]
    ReplyMismatch { requested: String, answered: String },
}

/// Convenience alias for fingerprint operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;
