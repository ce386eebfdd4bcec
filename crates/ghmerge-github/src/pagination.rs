//! `Link` header pagination.
//!
//! GitHub advertises further pages in a response header of the form:
//!
//! ```text
//! Link: <https://api.github.com/...?page=2>; rel="next",
//!       <https://api.github.com/...?page=7>; rel="last"
//! ```
//!
//! Continuation is driven entirely by the `rel="next"` entry — never by
//! assuming a page was "full".

use crate::error::{FetchError, FetchResult};

/// The page number advertised by the `rel="next"` entry, if any.
///
/// `Ok(None)` means the server advertised no further pages. An advertised
/// `rel="next"` entry whose page number cannot be read is a
/// [`FetchError::Decode`], not end-of-pagination: treating it as the end
/// would return a partial batch as complete.
pub fn next_page(url: &str, link_header: Option<&str>) -> FetchResult<Option<u64>> {
    let Some(header) = link_header else {
        return Ok(None);
    };
    let Some(entry) = header.split(',').find(|part| part.contains("rel=\"next\"")) else {
        return Ok(None);
    };
    match parse_page(entry) {
        Some(page) => Ok(Some(page)),
        None => Err(FetchError::Decode {
            url: url.to_string(),
            message: format!(
                "no readable page number in rel=\"next\" link: {}",
                entry.trim()
            ),
        }),
    }
}

/// The `page` query parameter of one `<url>; rel=...` entry.
fn parse_page(entry: &str) -> Option<u64> {
    let query = entry.find('?')? + 1;
    let end = entry[query..]
        .find('>')
        .map(|i| query + i)
        .unwrap_or(entry.len());
    entry[query..end]
        .split('&')
        .find_map(|param| param.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
}
