//! Error types for remote metadata fetching.

use thiserror::Error;

/// Errors from fetching pull request metadata.
///
/// Any failure on any page of a paginated fetch surfaces as one of these
/// for the whole batch — partial sequences are never returned.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection, TLS, timeout, body read).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A response body did not decode as the expected record shape.
    #[error("unexpected response shape from {url}: {message}")]
    Decode { url: String, message: String },

    /// A fetched record failed sanitization.
    #[error(transparent)]
    Sanitize(#[from] ghmerge_sanitize::SanitizeError),
}

/// Convenience alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
