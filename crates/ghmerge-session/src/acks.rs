//! Reviewer acknowledgement extraction.

use ghmerge_types::{CommitId, RemoteRecord};

/// Acknowledgements keyed by author, in first-seen author order.
///
/// Later records from the same author overwrite the earlier entry without
/// moving it — the caller supplies records chronologically, so the latest
/// statement from each reviewer is authoritative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AckMap {
    entries: Vec<(String, String)>,
}

impl AckMap {
    /// Insert or overwrite the entry for `author`.
    pub fn insert(&mut self, author: &str, line: String) {
        match self.entries.iter_mut().find(|(a, _)| a == author) {
            Some((_, existing)) => *existing = line,
            None => self.entries.push((author.to_string(), line)),
        }
    }

    /// The matched line for `author`, if any.
    pub fn get(&self, author: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(a, _)| a == author)
            .map(|(_, l)| l.as_str())
    }

    /// Iterate `(author, line)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, l)| (a.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan sanitized comments and reviews for ACKs of the head commit.
///
/// A line qualifies if it contains the literal substring `ACK` and the
/// abbreviated head commit id (first six hex characters) — reviewers
/// rarely paste the full hash, and collisions within one pull request are
/// not a realistic concern. The first qualifying line of a record is the
/// one recorded; the last qualifying record per author wins.
pub fn extract_acks(head_commit: &CommitId, records: &[RemoteRecord]) -> AckMap {
    let abbrev = head_commit.ack_prefix();
    let mut acks = AckMap::default();
    for record in records {
        let matched = record
            .body
            .lines()
            .find(|line| line.contains("ACK") && line.contains(abbrev));
        if let Some(line) = matched {
            acks.insert(&record.author, line.to_string());
        }
    }
    acks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head() -> CommitId {
        CommitId::parse("abcdef0123456789abcdef0123456789abcdef01").unwrap()
    }

    #[test]
    fn matching_line_is_recorded() {
        let records = vec![RemoteRecord::new("alice", "ACK abcdef0\nlgtm")];
        let acks = extract_acks(&head(), &records);
        assert_eq!(acks.get("alice"), Some("ACK abcdef0"));
    }

    #[test]
    fn last_record_per_author_wins() {
        let records = vec![
            RemoteRecord::new("alice", "ACK abcdef0\nlgtm"),
            RemoteRecord::new("alice", "ACK abcdef0 again"),
        ];
        let acks = extract_acks(&head(), &records);
        assert_eq!(acks.len(), 1);
        assert_eq!(acks.get("alice"), Some("ACK abcdef0 again"));
    }

    #[test]
    fn missing_commit_prefix_contributes_nothing() {
        let records = vec![
            RemoteRecord::new("bob", "ACK deadbe"),
            RemoteRecord::new("carol", "looks good to me"),
        ];
        let acks = extract_acks(&head(), &records);
        assert!(acks.is_empty());
    }

    #[test]
    fn authors_keep_first_seen_order() {
        let records = vec![
            RemoteRecord::new("zoe", "ACK abcdef0"),
            RemoteRecord::new("adam", "ACK abcdef0"),
            RemoteRecord::new("zoe", "re-ACK abcdef0"),
        ];
        let acks = extract_acks(&head(), &records);
        let authors: Vec<&str> = acks.iter().map(|(a, _)| a).collect();
        assert_eq!(authors, vec!["zoe", "adam"]);
        assert_eq!(acks.get("zoe"), Some("re-ACK abcdef0"));
    }

    #[test]
    fn first_qualifying_line_within_a_body() {
        let records = vec![RemoteRecord::new(
            "dan",
            "utACK abcdef0 on first read\nACK abcdef0 after testing",
        )];
        let acks = extract_acks(&head(), &records);
        assert_eq!(acks.get("dan"), Some("utACK abcdef0 on first read"));
    }
}
