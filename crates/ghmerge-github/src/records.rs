//! Typed wire records for the GitHub REST API.
//!
//! Only the fields ghmerge uses are modelled; everything else in the
//! response is ignored. Validation happens once, at the sanitizer
//! boundary, when the wire records are converted into [`RemoteRecord`]s.

use ghmerge_sanitize::{sanitize_record, strip_control, validate_handle};
use ghmerge_types::RemoteRecord;
use serde::Deserialize;

use crate::error::FetchResult;

/// The `user` object embedded in every record.
#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub login: String,
}

/// The `base` object of a pull request.
#[derive(Debug, Deserialize)]
pub(crate) struct BaseData {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// Wire shape of `GET repos/{repo}/pulls/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestData {
    pub title: Option<String>,
    pub body: Option<String>,
    pub user: UserData,
    pub base: BaseData,
}

/// Wire shape of one comment or review. Review bodies may be null.
#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
    pub body: Option<String>,
    pub user: UserData,
}

/// A sanitized pull request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestInfo {
    /// Title with control characters and newlines stripped, trimmed.
    pub title: String,
    /// Description body, control-stripped (newlines kept), trimmed.
    pub body: String,
    /// Validated author handle.
    pub author: String,
    /// The branch the pull request targets upstream.
    pub base_ref: String,
}

impl PullRequestData {
    pub(crate) fn sanitized(self) -> FetchResult<PullRequestInfo> {
        validate_handle(&self.user.login)?;
        let title = strip_control(&self.title.unwrap_or_default(), false);
        let body = strip_control(&self.body.unwrap_or_default(), true);
        Ok(PullRequestInfo {
            title: title.trim().to_string(),
            body: body.trim().to_string(),
            author: self.user.login,
            // Branch names come from git itself, not free text; stripping
            // controls is still cheap hygiene before display.
            base_ref: strip_control(&self.base.ref_name, false),
        })
    }
}

impl CommentData {
    pub(crate) fn sanitized(self) -> FetchResult<RemoteRecord> {
        let record = RemoteRecord::new(self.user.login, self.body.unwrap_or_default());
        Ok(sanitize_record(record)?)
    }
}
