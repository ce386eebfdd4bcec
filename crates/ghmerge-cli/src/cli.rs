use clap::Parser;

/// Utility to merge, sign and push pull requests.
///
/// Configuration comes from git config:
/// `githubmerge.repository` (mandatory, `<owner>/<repo>`),
/// `user.signingkey` (mandatory),
/// `githubmerge.host` (default `git@github.com`),
/// `githubmerge.branch` (no default),
/// `githubmerge.testcmd` (default: none),
/// `githubmerge.pushmirrors` (comma-separated, master merges only),
/// `user.ghtoken` (default: none).
#[derive(Debug, Parser)]
#[command(name = "ghmerge", version)]
pub struct Cli {
    /// Pull request id to merge.
    #[arg(value_name = "PULL")]
    pub pull: u64,

    /// Branch to merge against (default: githubmerge.branch setting, or
    /// base branch for the pull, or 'master').
    #[arg(value_name = "BRANCH")]
    pub branch: Option<String>,

    /// The repo to fetch the pull request from, for monotree setups. Can
    /// only be used when merging onto the master development branch
    /// (default: githubmerge.repository setting).
    #[arg(short = 'r', long = "repo-from", value_name = "REPO")]
    pub repo_from: Option<String>,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pull_and_optional_branch() {
        let cli = Cli::parse_from(["ghmerge", "1234", "maint-1.0"]);
        assert_eq!(cli.pull, 1234);
        assert_eq!(cli.branch.as_deref(), Some("maint-1.0"));
        assert_eq!(cli.repo_from, None);
    }

    #[test]
    fn parses_repo_from_flag() {
        let cli = Cli::parse_from(["ghmerge", "-r", "acme/monotree", "7"]);
        assert_eq!(cli.pull, 7);
        assert_eq!(cli.repo_from.as_deref(), Some("acme/monotree"));
    }
}
