//! Settings read from git configuration storage.

use ghmerge_git::GitRunner;
use thiserror::Error;

/// A mandatory configuration key is missing.
#[derive(Debug, Error)]
#[error("no {what} configured. Set one using:\n  git config {key} {placeholder}")]
pub struct MissingConfig {
    what: &'static str,
    key: &'static str,
    placeholder: &'static str,
}

/// Errors loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Missing(#[from] MissingConfig),
    #[error(transparent)]
    Git(#[from] ghmerge_git::GitError),
}

/// Everything ghmerge reads from `git config`.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Primary repository slug, `<owner>/<repo>`.
    pub repository: String,
    /// Remote host, either `git@host` or an `http(s)://` prefix.
    pub host: String,
    /// Default target branch, if configured.
    pub branch: Option<String>,
    /// Build/test command run during verification.
    pub test_command: Option<String>,
    /// API token for authenticated requests.
    pub github_token: Option<String>,
    /// Mirrors that master merges are pushed to, in order.
    pub push_mirrors: Vec<String>,
}

impl Settings {
    /// Load settings, failing fast on missing mandatory keys before any
    /// repository mutation happens.
    pub fn from_git(git: &GitRunner) -> Result<Self, SettingsError> {
        let repository = git
            .config_get("githubmerge.repository")?
            .ok_or(MissingConfig {
                what: "repository",
                key: "githubmerge.repository",
                placeholder: "<owner>/<repo>",
            })?;
        // The key itself is consumed by git at signing time; requiring it
        // up front keeps the failure before any refs are created.
        git.config_get("user.signingkey")?.ok_or(MissingConfig {
            what: "GPG signing key",
            key: "--global user.signingkey",
            placeholder: "<key>",
        })?;

        let host = git
            .config_get("githubmerge.host")?
            .unwrap_or_else(|| "git@github.com".to_string());
        let push_mirrors = git
            .config_get("githubmerge.pushmirrors")?
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            repository,
            host,
            branch: git.config_get("githubmerge.branch")?,
            test_command: git.config_get("githubmerge.testcmd")?,
            github_token: git.config_get("user.ghtoken")?,
            push_mirrors,
        })
    }

    /// The fetch/push URL for a repository slug on the configured host.
    pub fn host_url(&self, repo: &str) -> String {
        if self.host.starts_with("http:") || self.host.starts_with("https:") {
            format!("{}/{}.git", self.host, repo)
        } else {
            format!("{}:{}", self.host, repo)
        }
    }
}
