//! GitHub metadata fetcher.
//!
//! Retrieves the pull request record, issue comments, and reviews over the
//! REST API with blocking HTTP. Comments and reviews are paginated; the
//! next page is taken from the response `Link` header's `rel="next"` entry
//! rather than assuming uniform page sizes. A failure on any page discards
//! the whole batch: a partial ACK set would misrepresent sign-off in a
//! signed artifact.
//!
//! Every piece of text leaves this crate sanitized — callers never see raw
//! remote data.

pub mod client;
pub mod error;
pub mod pagination;
pub mod records;

pub use client::GithubClient;
pub use error::{FetchError, FetchResult};
pub use records::PullRequestInfo;
