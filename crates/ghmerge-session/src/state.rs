use std::fmt;

/// The phases of a merge session, in order.
///
/// Every session ends in `CleanedUp`, reached exactly once, whether the
/// run succeeded or aborted at any earlier phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has touched the repository yet.
    Init,
    /// The four ephemeral refs exist and the local merge branch is
    /// checked out.
    BranchesFetched,
    /// The unsigned merge commit exists and passed the symlink scan.
    MergeConstructed,
    /// The baseline tree fingerprint is recorded.
    PreFingerprinted,
    /// The operator's build/test step completed and any divergence from
    /// the remote merge was explicitly overridden.
    Verified,
    /// The fingerprint was recomputed and matches the baseline.
    PostFingerprinted,
    /// ACKs and the fingerprint trailer are amended into the message.
    MessageFinalized,
    /// The commit carries a signature.
    Signed,
    /// The result is on the target branch of every configured remote.
    Pushed,
    /// The session aborted; the reason is the stringified error.
    Aborted(String),
    /// Ephemeral refs deleted, original branch checked out.
    CleanedUp,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::BranchesFetched => write!(f, "branches-fetched"),
            Self::MergeConstructed => write!(f, "merge-constructed"),
            Self::PreFingerprinted => write!(f, "pre-fingerprinted"),
            Self::Verified => write!(f, "verified"),
            Self::PostFingerprinted => write!(f, "post-fingerprinted"),
            Self::MessageFinalized => write!(f, "message-finalized"),
            Self::Signed => write!(f, "signed"),
            Self::Pushed => write!(f, "pushed"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
            Self::CleanedUp => write!(f, "cleaned-up"),
        }
    }
}
