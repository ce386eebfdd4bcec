use ghmerge_types::{PullRequestRef, RemoteRecord};
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::pagination::next_page;
use crate::records::{CommentData, PullRequestData, PullRequestInfo};

/// Default REST API root.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Blocking GitHub API client.
///
/// Holds one HTTP client for the session and an optional token sent as
/// `Authorization: token <t>` on every request.
pub struct GithubClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Client against the public API.
    pub fn new(token: Option<String>) -> FetchResult<Self> {
        Self::with_base_url(DEFAULT_API_BASE, token)
    }

    /// Client against an alternate API root (enterprise installs, tests).
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> FetchResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("ghmerge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get(&self, url: &str) -> FetchResult<reqwest::blocking::Response> {
        debug!(url, "GET");
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("token {token}"));
        }
        let resp = req.send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> FetchResult<(T, Option<String>)> {
        let resp = self.get(url)?;
        let link = resp
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = resp.text()?;
        let value = serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok((value, link))
    }

    /// Fetch and sanitize the pull request record.
    pub fn pull_request(&self, pull: &PullRequestRef) -> FetchResult<PullRequestInfo> {
        let url = format!("{}/repos/{}/pulls/{}", self.base_url, pull.repo, pull.id);
        let (data, _link): (PullRequestData, _) = self.get_json(&url)?;
        data.sanitized()
    }

    /// Fetch all issue comments on the pull request, sanitized, in order.
    pub fn comments(&self, pull: &PullRequestRef) -> FetchResult<Vec<RemoteRecord>> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.base_url, pull.repo, pull.id
        );
        self.paginated(&url)
    }

    /// Fetch all reviews on the pull request, sanitized, in order.
    pub fn reviews(&self, pull: &PullRequestRef) -> FetchResult<Vec<RemoteRecord>> {
        let url = format!(
            "{}/repos/{}/pulls/{}/reviews",
            self.base_url, pull.repo, pull.id
        );
        self.paginated(&url)
    }

    /// Walk `?page=N` until no `rel="next"` is advertised, concatenating
    /// pages in request order. Any failure fails the whole batch.
    fn paginated(&self, base: &str) -> FetchResult<Vec<RemoteRecord>> {
        let mut records = Vec::new();
        let mut page: u64 = 1;
        loop {
            let url = format!("{base}?page={page}");
            let (batch, link): (Vec<CommentData>, _) = self.get_json(&url)?;
            for data in batch {
                records.push(data.sanitized()?);
            }
            match next_page(&url, link.as_deref())? {
                Some(next) => page = next,
                None => break,
            }
        }
        debug!(base, count = records.len(), "paginated fetch complete");
        Ok(records)
    }
}
