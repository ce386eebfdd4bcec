//! Error types for git subprocess operations.

use thiserror::Error;

/// Errors from driving the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` binary could not be launched at all.
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    /// A git command exited non-zero.
    #[error("`{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Git produced output that was expected to be UTF-8 but was not.
    #[error("non-utf8 output from `{command}`")]
    NonUtf8Output { command: String },

    /// A `ls-tree` line did not match `<mode> <type> <oid>\t<path>`.
    #[error("malformed tree entry: {entry:?}")]
    BadTreeEntry { entry: String },

    /// The batch channel returned something other than the expected
    /// header or trailer. Indicates protocol desynchronization.
    #[error("cat-file batch protocol error: {message}")]
    Protocol { message: String },

    /// The batch channel delivered fewer content bytes than the header
    /// declared. Indicates desynchronization or store corruption; never
    /// retried.
    #[error("truncated read from object store: expected {expected} bytes, got {actual}")]
    TruncatedRead { expected: u64, actual: u64 },

    /// An id returned by git failed validation.
    #[error(transparent)]
    Type(#[from] ghmerge_types::TypeError),

    /// I/O failure on a subprocess pipe.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for git operations.
pub type GitResult<T> = std::result::Result<T, GitError>;
