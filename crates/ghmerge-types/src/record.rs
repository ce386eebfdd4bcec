use serde::{Deserialize, Serialize};

/// A text record fetched from the collaboration service.
///
/// Covers pull requests (which carry a title), issue comments, and reviews.
/// The raw form is untrusted: bodies and titles may contain terminal escape
/// sequences, bidirectional overrides, or other control characters, and the
/// author handle may be arbitrary text. Records must pass through the
/// sanitizer before they are rendered or embedded in a signed artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// The author's account handle.
    pub author: String,
    /// Title, present only on pull requests. Never contains newlines once
    /// sanitized.
    pub title: Option<String>,
    /// Body text. May span multiple lines.
    pub body: String,
}

impl RemoteRecord {
    /// A record without a title (comment or review).
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            title: None,
            body: body.into(),
        }
    }

    /// A record with a title (pull request).
    pub fn with_title(
        author: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            title: Some(title.into()),
            body: body.into(),
        }
    }
}
