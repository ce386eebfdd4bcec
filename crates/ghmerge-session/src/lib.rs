//! The merge session.
//!
//! Orchestrates the end-to-end workflow of merging a reviewed pull request
//! into a target branch: fetch the ephemeral refs, reconstruct the merge
//! deterministically, fingerprint the tree, hand the result to the operator
//! for build/test verification, re-fingerprint to prove nothing was
//! tampered with, attach reviewer ACKs, sign, and push. Every ephemeral
//! ref is torn down no matter where the session ends.
//!
//! The orchestrator is generic over three capability seams:
//!
//! - [`SessionVcs`] — the version-control primitives (backed by `git`);
//! - [`CommentSource`] — pull request comments and reviews;
//! - [`Operator`] — the human in the loop (prompts and display).

pub mod acks;
pub mod error;
pub mod git_ops;
pub mod message;
pub mod session;
pub mod state;
pub mod traits;

pub use acks::{extract_acks, AckMap};
pub use error::{SessionError, SessionResult};
pub use git_ops::GitSessionOps;
pub use session::{MergeOrchestrator, SessionConfig};
pub use state::SessionState;
pub use traits::{CommentSource, MergeDetails, Operator, SessionVcs};
