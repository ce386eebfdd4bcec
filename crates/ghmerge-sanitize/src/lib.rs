//! Sanitization of untrusted text from the collaboration service.
//!
//! Pull request titles, comment bodies, and author handles arrive as
//! arbitrary text. Before any of it is rendered to a terminal or embedded in
//! a signed commit message, it passes through this crate:
//!
//! - [`strip_control`] removes Unicode category-C characters (terminal
//!   escapes, bidirectional overrides, zero-width characters, private use),
//!   optionally keeping newlines;
//! - [`validate_handle`] enforces the `[A-Za-z0-9-]+` shape of account
//!   handles;
//! - [`sanitize_record`] applies both to a full [`RemoteRecord`].

pub mod error;

use ghmerge_types::RemoteRecord;

pub use error::{SanitizeError, SanitizeResult};

/// Returns `true` for characters in Unicode general category C.
///
/// Covers Cc (control), the Cf (format) ranges, and Co (private use).
/// Surrogates (Cs) cannot occur in a Rust `str`. Unassigned code points (Cn)
/// are not tracked; they render as replacement glyphs rather than doing
/// anything to a terminal.
fn is_category_c(ch: char) -> bool {
    if ch.is_control() {
        return true;
    }
    matches!(ch,
        // Cf: format characters.
        '\u{00AD}'
        | '\u{0600}'..='\u{0605}'
        | '\u{061C}'
        | '\u{06DD}'
        | '\u{070F}'
        | '\u{0890}'..='\u{0891}'
        | '\u{08E2}'
        | '\u{180E}'
        | '\u{200B}'..='\u{200F}'
        | '\u{202A}'..='\u{202E}'
        | '\u{2060}'..='\u{2064}'
        | '\u{2066}'..='\u{206F}'
        | '\u{FEFF}'
        | '\u{FFF9}'..='\u{FFFB}'
        | '\u{110BD}'
        | '\u{110CD}'
        | '\u{13430}'..='\u{1343F}'
        | '\u{1BCA0}'..='\u{1BCA3}'
        | '\u{1D173}'..='\u{1D17A}'
        | '\u{E0001}'
        | '\u{E0020}'..='\u{E007F}'
        // Co: private use areas.
        | '\u{E000}'..='\u{F8FF}'
        | '\u{F0000}'..='\u{FFFFD}'
        | '\u{100000}'..='\u{10FFFD}'
    )
}

/// Strip control characters from a string.
///
/// Removes every category-C character; when `keep_newlines` is set, `\n` is
/// retained. This prevents fetched text from emitting ANSI escapes, bells,
/// or bidi overrides when printed, and from smuggling invisible content into
/// a signed commit message.
///
/// Idempotent, and the output is never longer than the input.
pub fn strip_control(text: &str, keep_newlines: bool) -> String {
    text.chars()
        .filter(|&ch| !is_category_c(ch) || (ch == '\n' && keep_newlines))
        .collect()
}

/// Validate an account handle.
///
/// Handles may only contain alphanumeric characters or hyphens, and must be
/// non-empty. Returns the handle unchanged on success.
pub fn validate_handle(handle: &str) -> SanitizeResult<&str> {
    let valid = !handle.is_empty()
        && handle
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if valid {
        Ok(handle)
    } else {
        // Strip the offending handle before it lands in an error message.
        Err(SanitizeError::InvalidHandle {
            handle: strip_control(handle, false),
        })
    }
}

/// Sanitize a full remote record.
///
/// The title (pull requests only) is stripped with newlines removed, the
/// body with newlines kept. A malformed author handle fails the whole
/// record: it is never silently dropped or renamed, because an ACK
/// attributed to a mangled handle would misrepresent sign-off.
pub fn sanitize_record(record: RemoteRecord) -> SanitizeResult<RemoteRecord> {
    validate_handle(&record.author)?;
    Ok(RemoteRecord {
        author: record.author,
        title: record.title.map(|t| strip_control(&t, false)),
        body: strip_control(&record.body, true),
    })
}
