//! The session error taxonomy.
//!
//! Each variant corresponds to one failure policy from the design:
//! session-fatal precondition violations (`RefNotFound`, `MergeConflict`,
//! `SymlinkIntroduced`, `TreeMutated`) are never retried and always route
//! through cleanup; signing failures are handled by reprompting inside the
//! sign loop and never surface here; push failures are fatal per remote
//! with no rollback of mirrors that already succeeded.

use thiserror::Error;

/// Errors that terminate a merge session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The target branch could not be checked out.
    #[error("cannot check out branch {branch}")]
    Checkout { branch: String },

    /// Fetching the pull request refs from the remote failed.
    #[error("cannot find pull request {pull} or branch {branch} on {remote}")]
    FetchFailed {
        pull: String,
        branch: String,
        remote: String,
    },

    /// An expected upstream ref (head or remote merge) is missing.
    #[error("cannot find {what} of pull request {pull} on {remote}")]
    RefNotFound {
        what: String,
        pull: String,
        remote: String,
    },

    /// The merge did not apply cleanly. The attempted merge has been
    /// aborted; no partial state remains.
    #[error("pull request cannot be merged cleanly")]
    MergeConflict,

    /// The merge commit did not come out as intended (typically the pull
    /// request was already merged, so no commit was created).
    #[error("creating merge failed (already merged?)")]
    MergeFailed,

    /// The merged tree contains symbolic links.
    #[error("merged tree introduces symlinks: {}", paths.join(", "))]
    SymlinkIntroduced { paths: Vec<String> },

    /// The operator's test command exited non-zero.
    #[error("test command `{command}` failed with code {code}")]
    TestCommandFailed { command: String, code: i32 },

    /// The local merge differs from the remote service's merge and the
    /// operator declined to override.
    #[error("merge differs from the remote service's merge")]
    DivergenceRejected,

    /// The tree fingerprint changed across the verification window.
    #[error("tree hash changed unexpectedly during verification")]
    TreeMutated,

    /// Amending the commit message did not stick.
    #[error("cannot update merge commit message")]
    MessageAmendFailure,

    /// The operator rejected the merge at the sign or push prompt.
    #[error("operator rejected the merge")]
    Rejected,

    /// Pushing to a remote failed. Pushes that already succeeded are
    /// left in place.
    #[error("push to {remote} failed")]
    PushFailure {
        remote: String,
        #[source]
        source: ghmerge_git::GitError,
    },

    /// Fetching comments or reviews failed; the whole batch is discarded.
    #[error("could not fetch pull request comments and reviews")]
    RemoteFetch(#[from] ghmerge_github::FetchError),

    /// Tree fingerprinting failed.
    #[error("unable to compute tree hash")]
    Tree(#[from] ghmerge_tree::TreeError),

    /// An underlying git operation failed outside the cases above.
    #[error(transparent)]
    Git(#[from] ghmerge_git::GitError),

    /// Reading operator input failed (e.g. stdin closed).
    #[error("operator input unavailable: {0}")]
    Input(#[from] std::io::Error),
}

impl SessionError {
    /// Process exit code for this failure, matching the historical
    /// numbering operators script against.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Checkout { .. } | Self::FetchFailed { .. } | Self::RefNotFound { .. } => 3,
            Self::MergeConflict
            | Self::MergeFailed
            | Self::SymlinkIntroduced { .. }
            | Self::MessageAmendFailure
            | Self::Tree(_) => 4,
            Self::TestCommandFailed { .. } => 5,
            Self::DivergenceRejected => 6,
            Self::TreeMutated => 8,
            Self::Rejected
            | Self::PushFailure { .. }
            | Self::RemoteFetch(_)
            | Self::Git(_)
            | Self::Input(_) => 1,
        }
    }
}

/// Convenience alias for session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_historical_numbering() {
        assert_eq!(
            SessionError::Checkout {
                branch: "master".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(SessionError::MergeConflict.exit_code(), 4);
        assert_eq!(
            SessionError::SymlinkIntroduced { paths: vec![] }.exit_code(),
            4
        );
        assert_eq!(
            SessionError::TestCommandFailed {
                command: "make check".into(),
                code: 2
            }
            .exit_code(),
            5
        );
        assert_eq!(SessionError::DivergenceRejected.exit_code(), 6);
        assert_eq!(SessionError::TreeMutated.exit_code(), 8);
        assert_eq!(SessionError::Rejected.exit_code(), 1);
    }
}
