//! Error types for sanitization.

use thiserror::Error;

/// Errors from sanitizing untrusted remote text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    /// An author handle contained characters outside `[A-Za-z0-9-]` or was
    /// empty. The embedded handle has already been control-stripped.
    #[error("account handle contains invalid characters: {handle:?}")]
    InvalidHandle { handle: String },
}

/// Convenience alias for sanitizer operations.
pub type SanitizeResult<T> = std::result::Result<T, SanitizeError>;
