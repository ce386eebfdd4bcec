//! Foundation types for ghmerge.
//!
//! This crate provides the identifiers shared by every other ghmerge crate:
//!
//! - [`PullRequestRef`] — a pull request on a source repository (`owner/repo#id`)
//! - [`CommitId`] — a full 40-character git commit hash
//! - [`TreeFingerprint`] — the SHA-512 content digest of an entire tree
//! - [`RemoteRecord`] — an untrusted text record fetched from the
//!   collaboration service (pull request, comment, or review)

pub mod error;
pub mod record;
pub mod refs;

pub use error::TypeError;
pub use record::RemoteRecord;
pub use refs::{CommitId, PullRequestRef, TreeFingerprint};
