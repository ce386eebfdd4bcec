//! Merge commit message composition.
//!
//! The message is built in two steps: [`compose`] at merge construction,
//! then [`finalize`] after verification appends the ACK block and the
//! `Tree-SHA512:` provenance trailer. All text flowing in here has already
//! been sanitized.

use ghmerge_types::{PullRequestRef, TreeFingerprint};

use crate::acks::AckMap;

/// The summary line: `Merge <repo>#<id>` with the title when present.
pub fn summary_line(pull: &PullRequestRef, title: &str) -> String {
    if title.is_empty() {
        format!("Merge {pull}")
    } else {
        format!("Merge {pull}: {title}")
    }
}

/// The initial message: summary, per-commit log (oldest first), and the
/// pull request description indented by two spaces.
pub fn compose(
    pull: &PullRequestRef,
    title: &str,
    commit_lines: &[String],
    description: &str,
) -> String {
    let mut message = summary_line(pull, title);
    message.push_str("\n\n");
    message.push_str(&commit_lines.join("\n"));
    message.push_str("\n\nPull request description:\n\n  ");
    message.push_str(&description.replace('\n', "\n  "));
    message.push('\n');
    message
}

/// The ACK block appended after verification, or an explicit notice when
/// no reviewer acknowledged the top commit.
pub fn ack_block(acks: &AckMap) -> String {
    if acks.is_empty() {
        return "\n\nTop commit has no ACKs.\n".to_string();
    }
    let mut block = String::from("\n\nACKs for top commit:\n");
    for (author, line) in acks.iter() {
        block.push_str(&format!("  {author}:\n    {line}\n"));
    }
    block
}

/// Append the ACK block and the provenance trailer to the message.
///
/// Each block is separated from what precedes it by one blank line beyond
/// the message's own trailing newline, byte-compatible with merges
/// produced by earlier releases.
pub fn finalize(message: &str, acks: &AckMap, fingerprint: &TreeFingerprint) -> String {
    format!(
        "{}{}\n\nTree-SHA512: {}",
        message,
        ack_block(acks),
        fingerprint.as_hex()
    )
}
