//! Production [`SessionVcs`] implementation over the `git` binary.

use std::env;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use ghmerge_git::{GitError, GitResult, GitRunner};
use ghmerge_tree::TreeResult;
use ghmerge_types::{CommitId, PullRequestRef, TreeFingerprint};
use tracing::debug;

use crate::traits::SessionVcs;

/// Runs every session operation through a [`GitRunner`], plus the two
/// operator-verification subprocesses (test command, interactive shell).
pub struct GitSessionOps {
    git: GitRunner,
    shell: OsString,
}

impl GitSessionOps {
    /// Use `git` from `PATH` and the `SHELL` environment variable
    /// (falling back to `bash`) for verification subprocesses.
    pub fn new(git: GitRunner) -> Self {
        let shell = env::var_os("SHELL").unwrap_or_else(|| OsString::from("bash"));
        Self { git, shell }
    }

    /// Override the shell used for the test command and interactive drop.
    pub fn with_shell(git: GitRunner, shell: impl Into<OsString>) -> Self {
        Self {
            git,
            shell: shell.into(),
        }
    }

    fn shell_command(&self) -> Command {
        let mut cmd = Command::new(&self.shell);
        if let Some(dir) = self.git.workdir() {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl SessionVcs for GitSessionOps {
    fn checkout(&self, branch: &str) -> GitResult<()> {
        self.git.checkout(branch)
    }

    fn checkout_new(&self, branch: &str) -> GitResult<()> {
        self.git.checkout_new(branch)
    }

    fn fetch(&self, remote: &str, refspecs: &[&str]) -> GitResult<()> {
        self.git.fetch(remote, refspecs)
    }

    fn ref_exists(&self, refname: &str) -> GitResult<bool> {
        self.git.ref_exists(refname)
    }

    fn rev_parse_commit(&self, refname: &str) -> GitResult<CommitId> {
        self.git.rev_parse_commit(refname)
    }

    fn delete_branch(&self, branch: &str) {
        self.git.delete_branch(branch)
    }

    fn merge_no_ff(&self, branch: &str, message: &str) -> GitResult<()> {
        self.git.merge_no_ff(branch, message)
    }

    fn abort_merge(&self) -> GitResult<()> {
        self.git.abort_merge()
    }

    fn head_subject(&self) -> GitResult<String> {
        self.git.head_subject()
    }

    fn commit_list(&self, range: &str) -> GitResult<Vec<String>> {
        self.git.commit_list(range)
    }

    fn amend_message(&self, message: &str) -> GitResult<()> {
        self.git.amend_message(message)
    }

    fn amend_signed(&self) -> GitResult<()> {
        self.git.amend_signed()
    }

    fn reset_hard(&self, refname: &str) -> GitResult<()> {
        self.git.reset_hard(refname)
    }

    fn push(&self, remote: &str, refspec: &str) -> GitResult<()> {
        self.git.push(remote, refspec)
    }

    fn diff_differs(&self, a: &str, b: &str) -> GitResult<bool> {
        self.git.diff_differs(a, b)
    }

    fn show_diff(&self, range: &str) -> GitResult<()> {
        self.git.show_diff(range)
    }

    fn show_log_graph(&self, range: &str, format: &str) -> GitResult<()> {
        self.git.show_log_graph(range, format)
    }

    fn tree_fingerprint(&self, commit: &str) -> TreeResult<TreeFingerprint> {
        ghmerge_tree::tree_sha512(&self.git, commit)
    }

    fn symlink_paths(&self, commit: &str) -> TreeResult<Vec<String>> {
        ghmerge_tree::symlink_paths(&self.git, commit)
    }

    fn run_test_command(&self, command: &str) -> GitResult<i32> {
        debug!(command, "running test command");
        let status = self
            .shell_command()
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|source| GitError::Launch {
                command: command.to_string(),
                source,
            })?;
        Ok(status.code().unwrap_or(-1))
    }

    fn interactive_shell(&self, pull: &PullRequestRef) -> GitResult<()> {
        let mut cmd = self.shell_command();
        cmd.arg("-i");
        // Debian's default prompt shows this, so the pull id stays visible
        // while the operator pokes around.
        if Path::new("/etc/debian_version").is_file() {
            cmd.env("debian_chroot", pull.id.to_string());
        }
        debug!(shell = ?self.shell, "dropping operator into a shell");
        cmd.status()
            .map_err(|source| GitError::Launch {
                command: "interactive shell".into(),
                source,
            })
            .map(drop)
    }
}
