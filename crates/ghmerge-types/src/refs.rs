use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A pull request on a source repository.
///
/// Displayed as `owner/repo#id`, the form used in merge commit subjects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository slug, `owner/repo`.
    pub repo: String,
    /// Numeric pull request id.
    pub id: u64,
}

impl PullRequestRef {
    /// Create a reference, validating the repository slug shape.
    pub fn new(repo: impl Into<String>, id: u64) -> Result<Self, TypeError> {
        let repo = repo.into();
        let mut parts = repo.splitn(2, '/');
        let owner = parts.next().unwrap_or("");
        let name = parts.next().unwrap_or("");
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(TypeError::InvalidRepoSlug { value: repo });
        }
        Ok(Self { repo, id })
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.id)
    }
}

/// A full git commit hash (40 lowercase hex characters).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitId(String);

impl CommitId {
    /// Parse and validate a full commit hash.
    pub fn parse(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.len() != 40 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidCommitId { value: s });
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The full 40-character hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The abbreviated prefix reviewers quote in ACK lines.
    ///
    /// Six characters: short enough to paste, and collisions within a
    /// single pull request are not a realistic concern.
    pub fn ack_prefix(&self) -> &str {
        &self.0[..6]
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", &self.0[..8])
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The SHA-512 content digest of an entire tree snapshot.
///
/// Two commits have equal fingerprints iff their (path, content) sets are
/// identical; file modes and timestamps are excluded. Embedded in the final
/// commit message as the `Tree-SHA512:` trailer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeFingerprint(String);

impl TreeFingerprint {
    /// Wrap a hex digest produced by the fingerprint engine.
    pub fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    /// The hex digest string.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TreeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeFingerprint({}..)", &self.0[..self.0.len().min(12)])
    }
}

impl fmt::Display for TreeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
