use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use ghmerge_types::CommitId;
use tracing::debug;

use crate::error::{GitError, GitResult};

/// Captured result of a one-shot git invocation.
#[derive(Debug)]
pub struct CommandOutput {
    /// Process exit code (`-1` if terminated by signal).
    pub code: i32,
    /// Raw stdout bytes. Tree paths may be arbitrary bytes, so no UTF-8
    /// assumption is made here.
    pub stdout: Vec<u8>,
    /// Stderr, lossily decoded for error reporting.
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout as UTF-8, trailing whitespace trimmed.
    pub fn stdout_str(&self, command: &str) -> GitResult<String> {
        String::from_utf8(self.stdout.clone())
            .map(|s| s.trim_end().to_string())
            .map_err(|_| GitError::NonUtf8Output {
                command: command.to_string(),
            })
    }
}

/// One entry of a recursive tree listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode as parsed octal (e.g. `0o100644`).
    pub mode: u32,
    /// Object type: `blob` or `tree` (`commit` for submodules).
    pub kind: String,
    /// Object id, hex.
    pub oid: String,
    /// Path relative to the repository root, raw bytes.
    pub path: Vec<u8>,
}

impl TreeEntry {
    /// Returns `true` for regular file entries (including executables).
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }

    /// Returns `true` if the mode's file-type bits mark a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.mode & 0o170000 == 0o120000
    }

    /// The path for display purposes.
    pub fn path_lossy(&self) -> String {
        String::from_utf8_lossy(&self.path).into_owned()
    }
}

/// Runs git commands and maps their results into typed outcomes.
///
/// The runner holds the program name (overridable, default `git`) and an
/// optional working directory passed as `git -C <dir>`. It is cheap to
/// clone and carries no mutable state.
#[derive(Clone, Debug)]
pub struct GitRunner {
    program: OsString,
    workdir: Option<PathBuf>,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner {
    /// A runner invoking `git` from `PATH` in the current directory.
    pub fn new() -> Self {
        Self {
            program: OsString::from("git"),
            workdir: None,
        }
    }

    /// Override the git program (e.g. from a `GIT` environment variable).
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            workdir: None,
        }
    }

    /// Run all commands inside `dir` via `git -C`.
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.workdir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// The configured git program, for spawning long-lived children.
    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// The configured working directory, if any.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(dir) = &self.workdir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("git {}", args.join(" "))
    }

    /// Run a command, capturing output. Does not treat a non-zero exit as
    /// an error; callers that want that use [`Self::checked`].
    pub fn run(&self, args: &[&str]) -> GitResult<CommandOutput> {
        let command = self.describe(args);
        debug!(%command, "running");
        let out = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Launch {
                command: command.clone(),
                source,
            })?;
        Ok(CommandOutput {
            code: out.status.code().unwrap_or(-1),
            stdout: out.stdout,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }

    /// Run a command, mapping a non-zero exit to [`GitError::CommandFailed`].
    pub fn checked(&self, args: &[&str]) -> GitResult<CommandOutput> {
        let out = self.run(args)?;
        if out.code != 0 {
            return Err(GitError::CommandFailed {
                command: self.describe(args),
                code: out.code,
                stderr: out.stderr,
            });
        }
        Ok(out)
    }

    /// Run a command with stdio inherited from this process, for output
    /// meant directly for the operator (diffs, log graphs, shells).
    pub fn passthrough(&self, args: &[&str]) -> GitResult<i32> {
        let command = self.describe(args);
        debug!(%command, "running (passthrough)");
        let status = self
            .command(args)
            .status()
            .map_err(|source| GitError::Launch { command, source })?;
        Ok(status.code().unwrap_or(-1))
    }

    // -----------------------------------------------------------------
    // Typed operations
    // -----------------------------------------------------------------

    /// Read a configuration value. Unset keys return `None`.
    pub fn config_get(&self, key: &str) -> GitResult<Option<String>> {
        let out = self.run(&["config", "--get", key])?;
        if out.code != 0 {
            return Ok(None);
        }
        Ok(Some(out.stdout_str("git config --get")?))
    }

    /// Absolute path of the working tree root containing the current
    /// working directory.
    pub fn toplevel(&self) -> GitResult<PathBuf> {
        let out = self.checked(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(out.stdout_str("git rev-parse --show-toplevel")?))
    }

    /// Check out an existing branch.
    pub fn checkout(&self, branch: &str) -> GitResult<()> {
        self.checked(&["checkout", "-q", branch]).map(drop)
    }

    /// Create and check out a new branch at the current head.
    pub fn checkout_new(&self, branch: &str) -> GitResult<()> {
        self.checked(&["checkout", "-q", "-b", branch]).map(drop)
    }

    /// Fetch the given refspecs from a remote URL or path.
    pub fn fetch(&self, remote: &str, refspecs: &[&str]) -> GitResult<()> {
        let mut args = vec!["fetch", "-q", remote];
        args.extend_from_slice(refspecs);
        self.checked(&args).map(drop)
    }

    /// Returns `true` if the ref resolves to a commit.
    pub fn ref_exists(&self, refname: &str) -> GitResult<bool> {
        let out = self.run(&["rev-parse", "--verify", "--quiet", refname])?;
        Ok(out.code == 0)
    }

    /// Resolve a ref to its full commit id.
    pub fn rev_parse_commit(&self, refname: &str) -> GitResult<CommitId> {
        let out = self.checked(&["rev-parse", "--verify", refname])?;
        let hex = out.stdout_str("git rev-parse")?;
        Ok(CommitId::parse(hex)?)
    }

    /// Force-delete a branch, ignoring failure. Used for ephemeral refs
    /// that may never have been created.
    pub fn delete_branch(&self, branch: &str) {
        match self.run(&["branch", "-q", "-D", branch]) {
            Ok(out) if out.code != 0 => {
                debug!(branch, "ephemeral branch absent, nothing to delete");
            }
            Ok(_) => debug!(branch, "deleted ephemeral branch"),
            Err(e) => debug!(branch, error = %e, "branch delete skipped"),
        }
    }

    /// Merge `branch` into the current head: no fast-forward, unsigned,
    /// with the exact message given. Leaves the in-progress merge in place
    /// on failure; callers abort it explicitly.
    pub fn merge_no_ff(&self, branch: &str, message: &str) -> GitResult<()> {
        self.checked(&[
            "merge", "-q", "--commit", "--no-edit", "--no-ff", "--no-gpg-sign", "-m", message,
            branch,
        ])
        .map(drop)
    }

    /// Abort an in-progress merge.
    pub fn abort_merge(&self) -> GitResult<()> {
        self.checked(&["merge", "--abort"]).map(drop)
    }

    /// Subject line of the current head commit.
    pub fn head_subject(&self) -> GitResult<String> {
        let out = self.checked(&["log", "-1", "--pretty=format:%s"])?;
        out.stdout_str("git log -1")
    }

    /// One line per commit in `range`, oldest first, merges excluded:
    /// `<hash> <subject> (<author>)`.
    pub fn commit_list(&self, range: &str) -> GitResult<Vec<String>> {
        let out = self.checked(&[
            "log",
            "--no-merges",
            "--topo-order",
            "--reverse",
            "--pretty=format:%H %s (%an)",
            range,
        ])?;
        let text = out.stdout_str("git log")?;
        Ok(text.lines().map(str::to_string).collect())
    }

    /// Rewrite the head commit's message without signing.
    pub fn amend_message(&self, message: &str) -> GitResult<()> {
        self.checked(&["commit", "--amend", "--no-gpg-sign", "-m", message])
            .map(drop)
    }

    /// Re-create the head commit in place with a GPG signature, keeping
    /// message and content.
    pub fn amend_signed(&self) -> GitResult<()> {
        self.checked(&["commit", "-q", "--gpg-sign", "--amend", "--no-edit"])
            .map(drop)
    }

    /// Hard-reset the current branch to `refname`.
    pub fn reset_hard(&self, refname: &str) -> GitResult<()> {
        self.checked(&["reset", "-q", "--hard", refname]).map(drop)
    }

    /// Push a refspec to a remote URL.
    pub fn push(&self, remote: &str, refspec: &str) -> GitResult<()> {
        self.checked(&["push", remote, refspec]).map(drop)
    }

    /// Returns `true` if the trees of `a` and `b` differ.
    pub fn diff_differs(&self, a: &str, b: &str) -> GitResult<bool> {
        let range = format!("{a}..{b}");
        let out = self.run(&["diff", "--quiet", &range])?;
        match out.code {
            0 => Ok(false),
            1 => Ok(true),
            code => Err(GitError::CommandFailed {
                command: format!("git diff --quiet {range}"),
                code,
                stderr: out.stderr,
            }),
        }
    }

    /// Show a diff directly on the operator's terminal.
    pub fn show_diff(&self, range: &str) -> GitResult<()> {
        self.passthrough(&["diff", range]).map(drop)
    }

    /// Show a commit graph for `range` directly on the operator's
    /// terminal, with the given pretty format.
    pub fn show_log_graph(&self, range: &str, format: &str) -> GitResult<()> {
        let pretty = format!("--pretty=tformat:{format}");
        self.passthrough(&["--no-pager", "log", "--graph", "--topo-order", &pretty, range])
            .map(drop)
    }

    /// Recursive listing of every entry reachable from `commit`.
    ///
    /// Uses `-z` so paths arrive as raw bytes instead of C-quoted strings.
    pub fn ls_tree(&self, commit: &str) -> GitResult<Vec<TreeEntry>> {
        let out = self.checked(&["ls-tree", "--full-tree", "-r", "-z", commit])?;
        parse_tree_entries(&out.stdout)
    }
}

/// Parse NUL-terminated `ls-tree -z` output: `<mode> <type> <oid>\t<path>`.
fn parse_tree_entries(raw: &[u8]) -> GitResult<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    for chunk in raw.split(|&b| b == 0) {
        if chunk.is_empty() {
            continue;
        }
        let entry = parse_tree_entry(chunk).ok_or_else(|| GitError::BadTreeEntry {
            entry: String::from_utf8_lossy(chunk).into_owned(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_tree_entry(chunk: &[u8]) -> Option<TreeEntry> {
    let tab = chunk.iter().position(|&b| b == b'\t')?;
    let (meta, path) = (&chunk[..tab], &chunk[tab + 1..]);
    let meta = std::str::from_utf8(meta).ok()?;
    let mut fields = meta.split_ascii_whitespace();
    let mode = u32::from_str_radix(fields.next()?, 8).ok()?;
    let kind = fields.next()?.to_string();
    let oid = fields.next()?.to_string();
    if path.is_empty() {
        return None;
    }
    Some(TreeEntry {
        mode,
        kind,
        oid,
        path: path.to_vec(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub(crate) fn scratch_repo() -> (tempfile::TempDir, GitRunner) {
        let dir = tempfile::tempdir().unwrap();
        let git = GitRunner::new().in_dir(dir.path());
        git.checked(&["init", "-q", "-b", "main"]).unwrap();
        git.checked(&["config", "user.email", "test@example.invalid"])
            .unwrap();
        git.checked(&["config", "user.name", "Test"]).unwrap();
        git.checked(&["config", "commit.gpgsign", "false"]).unwrap();
        (dir, git)
    }

    pub(crate) fn commit_file(
        dir: &tempfile::TempDir,
        git: &GitRunner,
        name: &str,
        content: &str,
        message: &str,
    ) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        git.checked(&["add", name]).unwrap();
        git.checked(&["commit", "-q", "-m", message]).unwrap();
    }

    #[test]
    fn config_get_set_and_unset() {
        let (_dir, git) = scratch_repo();
        assert_eq!(git.config_get("ghmerge.absent").unwrap(), None);
        git.checked(&["config", "ghmerge.present", "yes"]).unwrap();
        assert_eq!(
            git.config_get("ghmerge.present").unwrap(),
            Some("yes".into())
        );
    }

    #[test]
    fn head_subject_matches_commit_message() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a.txt", "hello", "first commit");
        assert_eq!(git.head_subject().unwrap(), "first commit");
    }

    #[test]
    fn ls_tree_lists_blobs_with_spaces_and_subdirs() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a file.txt", "x", "add a file");
        commit_file(&dir, &git, "sub/nested.txt", "y", "add nested");
        let entries = git.ls_tree("HEAD").unwrap();
        let paths: Vec<String> = entries.iter().map(TreeEntry::path_lossy).collect();
        assert!(paths.contains(&"a file.txt".to_string()));
        assert!(paths.contains(&"sub/nested.txt".to_string()));
        assert!(entries.iter().all(TreeEntry::is_blob));
        assert!(entries.iter().all(|e| !e.is_symlink()));
    }

    #[test]
    fn rev_parse_returns_full_commit_id() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a.txt", "hello", "first");
        let id = git.rev_parse_commit("HEAD").unwrap();
        assert_eq!(id.as_str().len(), 40);
    }

    #[test]
    fn ref_exists_distinguishes_branches() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a.txt", "hello", "first");
        assert!(git.ref_exists("refs/heads/main").unwrap());
        assert!(!git.ref_exists("refs/heads/no-such-branch").unwrap());
    }

    #[test]
    fn toplevel_resolves_from_a_subdirectory() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a.txt", "hello", "first");
        let sub = dir.path().join("deeply/nested");
        fs::create_dir_all(&sub).unwrap();
        let from_sub = GitRunner::new().in_dir(&sub);
        assert_eq!(
            from_sub.toplevel().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn delete_branch_tolerates_missing() {
        let (_dir, git) = scratch_repo();
        // Must not error even though the branch never existed.
        git.delete_branch("pull/1/local-merge");
    }

    #[test]
    fn diff_differs_detects_changes() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a.txt", "one", "first");
        git.checked(&["branch", "before"]).unwrap();
        commit_file(&dir, &git, "a.txt", "two", "second");
        assert!(git.diff_differs("before", "main").unwrap());
        assert!(!git.diff_differs("main", "main").unwrap());
    }

    #[test]
    fn commit_list_is_oldest_first() {
        let (dir, git) = scratch_repo();
        commit_file(&dir, &git, "a.txt", "one", "first");
        git.checked(&["branch", "start"]).unwrap();
        commit_file(&dir, &git, "b.txt", "two", "second");
        commit_file(&dir, &git, "c.txt", "three", "third");
        let lines = git.commit_list("start..main").unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("second (Test)"));
        assert!(lines[1].contains("third (Test)"));
    }

    #[test]
    fn parse_tree_entry_rejects_garbage() {
        assert!(parse_tree_entries(b"not a tree entry\0").is_err());
    }
}
