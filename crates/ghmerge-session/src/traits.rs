//! The orchestrator's capability seams.
//!
//! All side effects happen behind these traits: version-control primitives,
//! comment/review retrieval, and operator interaction. The production
//! implementations are [`crate::git_ops::GitSessionOps`], the GitHub client
//! adapter, and the CLI prompter; tests drive the full state machine
//! through scripted implementations.

use ghmerge_git::GitResult;
use ghmerge_github::FetchResult;
use ghmerge_tree::TreeResult;
use ghmerge_types::{CommitId, PullRequestRef, RemoteRecord, TreeFingerprint};

use crate::acks::AckMap;
use crate::error::SessionResult;

/// Version-control primitives consumed by the orchestrator.
///
/// Every method is synchronous and sequential; implementations must not
/// reorder or overlap operations.
pub trait SessionVcs {
    fn checkout(&self, branch: &str) -> GitResult<()>;
    fn checkout_new(&self, branch: &str) -> GitResult<()>;
    fn fetch(&self, remote: &str, refspecs: &[&str]) -> GitResult<()>;
    fn ref_exists(&self, refname: &str) -> GitResult<bool>;
    fn rev_parse_commit(&self, refname: &str) -> GitResult<CommitId>;
    /// Best-effort: refs that were never created are not an error.
    fn delete_branch(&self, branch: &str);
    /// Non-fast-forward unsigned merge of `branch` into the current head.
    /// On failure the in-progress merge is left for [`Self::abort_merge`].
    fn merge_no_ff(&self, branch: &str, message: &str) -> GitResult<()>;
    fn abort_merge(&self) -> GitResult<()>;
    fn head_subject(&self) -> GitResult<String>;
    /// `<hash> <subject> (<author>)` per commit in `range`, oldest first.
    fn commit_list(&self, range: &str) -> GitResult<Vec<String>>;
    fn amend_message(&self, message: &str) -> GitResult<()>;
    fn amend_signed(&self) -> GitResult<()>;
    fn reset_hard(&self, refname: &str) -> GitResult<()>;
    fn push(&self, remote: &str, refspec: &str) -> GitResult<()>;
    fn diff_differs(&self, a: &str, b: &str) -> GitResult<bool>;
    /// Show a diff on the operator's terminal.
    fn show_diff(&self, range: &str) -> GitResult<()>;
    /// Show a commit graph on the operator's terminal.
    fn show_log_graph(&self, range: &str, format: &str) -> GitResult<()>;
    fn tree_fingerprint(&self, commit: &str) -> TreeResult<TreeFingerprint>;
    fn symlink_paths(&self, commit: &str) -> TreeResult<Vec<String>>;
    /// Run the operator's test command through a shell; returns its exit
    /// code with stdio on the operator's terminal.
    fn run_test_command(&self, command: &str) -> GitResult<i32>;
    /// Drop the operator into an interactive shell in the working tree.
    fn interactive_shell(&self, pull: &PullRequestRef) -> GitResult<()>;
}

/// Source of pull request comments and reviews, already sanitized and in
/// chronological order.
pub trait CommentSource {
    fn comments_and_reviews(&self, pull: &PullRequestRef) -> FetchResult<Vec<RemoteRecord>>;
}

impl CommentSource for ghmerge_github::GithubClient {
    /// Comments first, then reviews, each batch in chronological order.
    fn comments_and_reviews(&self, pull: &PullRequestRef) -> FetchResult<Vec<RemoteRecord>> {
        let mut records = self.comments(pull)?;
        records.extend(self.reviews(pull)?);
        Ok(records)
    }
}

/// What the operator sees before signing off.
pub struct MergeDetails<'a> {
    pub pull: &'a PullRequestRef,
    pub title: &'a str,
    pub target_branch: &'a str,
    /// `base..head` range for the commit graph display.
    pub log_range: &'a str,
    /// Present once ACKs have been collected.
    pub acks: Option<&'a AckMap>,
    /// The finalized message, for mention/HTML-comment hygiene warnings.
    pub message: Option<&'a str>,
}

/// The human in the loop.
pub trait Operator {
    /// Ask a question and return the operator's reply, trimmed.
    fn prompt(&mut self, text: &str) -> SessionResult<String>;
    /// Show the merge summary. The commit graph itself is rendered by the
    /// VCS layer with [`Self::commit_format`].
    fn present(&mut self, details: &MergeDetails<'_>);
    /// Informational message.
    fn info(&mut self, text: &str);
    /// Warning the operator should read before answering a prompt.
    fn warn(&mut self, text: &str);
    /// Pretty format for the commit graph display.
    fn commit_format(&self) -> &str {
        "%H %s (%an)%d"
    }
}
