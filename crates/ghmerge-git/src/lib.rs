//! Git subprocess layer for ghmerge.
//!
//! Everything ghmerge does to a repository goes through the `git` binary.
//! This crate provides the two capability interfaces the rest of the
//! workspace builds on:
//!
//! - [`GitRunner`] — one-shot invocations with captured output, wrapped in
//!   typed operations (checkout, fetch, merge, amend, push, tree listing);
//!   a non-zero exit becomes a [`GitError::CommandFailed`] carrying the
//!   command line and stderr, never a panic.
//! - [`BatchChannel`] — a long-lived `git cat-file --batch` child used by
//!   the tree fingerprint engine to stream many blobs over one pipe with
//!   strict request/response ordering.

pub mod batch;
pub mod error;
pub mod runner;

pub use batch::{BatchChannel, BlobHeader};
pub use error::{GitError, GitResult};
pub use runner::{CommandOutput, GitRunner, TreeEntry};
