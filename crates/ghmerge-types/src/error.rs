//! Error types for the foundation crate.

use thiserror::Error;

/// Errors from constructing or parsing foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A commit id was not a 40-character lowercase hex string.
    #[error("invalid commit id: {value:?}")]
    InvalidCommitId { value: String },

    /// A repository slug was not of the form `owner/repo`.
    #[error("invalid repository slug: {value:?}")]
    InvalidRepoSlug { value: String },
}
