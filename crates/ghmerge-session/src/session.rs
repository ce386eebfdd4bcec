//! The merge orchestrator state machine.

use ghmerge_types::{CommitId, PullRequestRef, TreeFingerprint};
use tracing::{info, warn};

use crate::acks::{extract_acks, AckMap};
use crate::error::{SessionError, SessionResult};
use crate::message;
use crate::state::SessionState;
use crate::traits::{CommentSource, MergeDetails, Operator, SessionVcs};

/// Everything a session needs to know before it starts.
///
/// Title and description are already sanitized; the CLI fetches the pull
/// request record first to resolve the target branch.
pub struct SessionConfig {
    /// The pull request, on the repository it is fetched from.
    pub pull: PullRequestRef,
    /// Sanitized pull request title (may be empty).
    pub title: String,
    /// Sanitized pull request description (may be empty).
    pub description: String,
    /// The branch the merge lands on.
    pub target_branch: String,
    /// Push/fetch URL of the primary repository.
    pub host_repo: String,
    /// Fetch URL of the repository the pull request lives on. Differs
    /// from `host_repo` only for monotree setups.
    pub host_repo_from: String,
    /// Additional remotes the target branch is pushed to, in order.
    pub push_mirrors: Vec<String>,
    /// Build/test command; when absent the operator gets an interactive
    /// shell instead.
    pub test_command: Option<String>,
}

impl SessionConfig {
    /// `pull/<id>/base` — tip of the target branch at session start.
    pub fn base_branch(&self) -> String {
        format!("pull/{}/base", self.pull.id)
    }

    /// `pull/<id>/head` — the pull request's proposed commit.
    pub fn head_branch(&self) -> String {
        format!("pull/{}/head", self.pull.id)
    }

    /// `pull/<id>/merge` — the collaboration service's own merge, kept
    /// only for comparison.
    pub fn remote_merge_branch(&self) -> String {
        format!("pull/{}/merge", self.pull.id)
    }

    /// `pull/<id>/local-merge` — the merge this session constructs.
    pub fn local_merge_branch(&self) -> String {
        format!("pull/{}/local-merge", self.pull.id)
    }

    fn log_range(&self) -> String {
        format!("{}..{}", self.base_branch(), self.head_branch())
    }
}

/// Drives one merge session from construction through push, with
/// unconditional teardown.
pub struct MergeOrchestrator<V, C, O> {
    vcs: V,
    comments: C,
    operator: O,
    cfg: SessionConfig,
    state: SessionState,
    baseline: Option<TreeFingerprint>,
    head_commit: Option<CommitId>,
    acks: AckMap,
    merge_message: String,
}

impl<V: SessionVcs, C: CommentSource, O: Operator> MergeOrchestrator<V, C, O> {
    pub fn new(vcs: V, comments: C, operator: O, cfg: SessionConfig) -> Self {
        Self {
            vcs,
            comments,
            operator,
            cfg,
            state: SessionState::Init,
            baseline: None,
            head_commit: None,
            acks: AckMap::default(),
            merge_message: String::new(),
        }
    }

    /// The current phase. After [`Self::run`] returns this is always
    /// `CleanedUp`.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The finalized merge message, once one exists.
    pub fn merge_message(&self) -> &str {
        &self.merge_message
    }

    fn enter(&mut self, state: SessionState) {
        info!(state = %state, "session");
        self.state = state;
    }

    /// Run the session to completion. Whatever happens, teardown runs
    /// exactly once before this returns: the original target branch is
    /// checked out and all four ephemeral refs are deleted.
    ///
    /// A session is single-use; the outcome of calling `run` twice is an
    /// immediate `MergeFailed`.
    pub fn run(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Init {
            return Err(SessionError::MergeFailed);
        }
        let result = self.run_to_push();
        if let Err(e) = &result {
            warn!(error = %e, "session aborted");
            self.enter(SessionState::Aborted(e.to_string()));
        }
        self.cleanup();
        result
    }

    fn run_to_push(&mut self) -> SessionResult<()> {
        self.fetch_branches()?;
        self.construct_merge()?;
        self.pre_fingerprint()?;
        self.present(false);
        self.verify()?;
        self.post_fingerprint()?;
        self.finalize_message()?;
        self.sign()?;
        self.push()
    }

    fn fetch_branches(&mut self) -> SessionResult<()> {
        let target = self.cfg.target_branch.clone();
        self.vcs
            .checkout(&target)
            .map_err(|_| SessionError::Checkout { branch: target })?;

        let id = self.cfg.pull.id;
        let refspec_pull = format!("+refs/pull/{id}/*:refs/heads/pull/{id}/*");
        let refspec_base = format!(
            "+refs/heads/{}:refs/heads/{}",
            self.cfg.target_branch,
            self.cfg.base_branch()
        );
        self.vcs
            .fetch(&self.cfg.host_repo_from, &[&refspec_pull, &refspec_base])
            .map_err(|_| SessionError::FetchFailed {
                pull: self.cfg.pull.to_string(),
                branch: self.cfg.target_branch.clone(),
                remote: self.cfg.host_repo_from.clone(),
            })?;

        let head = self.cfg.head_branch();
        if !self.vcs.ref_exists(&format!("refs/heads/{head}"))? {
            return Err(self.ref_not_found("head"));
        }
        self.head_commit = Some(self.vcs.rev_parse_commit(&head)?);
        let remote_merge = self.cfg.remote_merge_branch();
        if !self.vcs.ref_exists(&format!("refs/heads/{remote_merge}"))? {
            return Err(self.ref_not_found("merge"));
        }

        self.vcs.checkout(&self.cfg.base_branch())?;
        // A leftover from an earlier run; fresh sessions start clean.
        self.vcs.delete_branch(&self.cfg.local_merge_branch());
        self.vcs.checkout_new(&self.cfg.local_merge_branch())?;
        self.enter(SessionState::BranchesFetched);
        Ok(())
    }

    fn ref_not_found(&self, what: &str) -> SessionError {
        SessionError::RefNotFound {
            what: what.to_string(),
            pull: self.cfg.pull.to_string(),
            remote: self.cfg.host_repo_from.clone(),
        }
    }

    fn construct_merge(&mut self) -> SessionResult<()> {
        let commit_lines = self.vcs.commit_list(&self.cfg.log_range())?;
        let msg = message::compose(
            &self.cfg.pull,
            &self.cfg.title,
            &commit_lines,
            &self.cfg.description,
        );

        if self.vcs.merge_no_ff(&self.cfg.head_branch(), &msg).is_err() {
            // Leave no partial merge behind before reporting the conflict.
            let _ = self.vcs.abort_merge();
            return Err(SessionError::MergeConflict);
        }
        let subject = self.vcs.head_subject()?;
        if subject.trim_end() != message::summary_line(&self.cfg.pull, &self.cfg.title).trim_end() {
            return Err(SessionError::MergeFailed);
        }

        let links = self.vcs.symlink_paths("HEAD")?;
        if !links.is_empty() {
            for path in &links {
                self.operator.warn(&format!("File {path} was a symlink"));
            }
            return Err(SessionError::SymlinkIntroduced { paths: links });
        }

        self.merge_message = msg;
        self.enter(SessionState::MergeConstructed);
        Ok(())
    }

    fn pre_fingerprint(&mut self) -> SessionResult<()> {
        self.baseline = Some(self.vcs.tree_fingerprint("HEAD")?);
        self.enter(SessionState::PreFingerprinted);
        Ok(())
    }

    /// Show the merge summary and commit graph to the operator.
    fn present(&mut self, with_outcome: bool) {
        let range = self.cfg.log_range();
        let details = MergeDetails {
            pull: &self.cfg.pull,
            title: &self.cfg.title,
            target_branch: &self.cfg.target_branch,
            log_range: &range,
            acks: with_outcome.then_some(&self.acks),
            message: with_outcome.then_some(self.merge_message.as_str()),
        };
        self.operator.present(&details);
        let format = self.operator.commit_format().to_string();
        if let Err(e) = self.vcs.show_log_graph(&range, &format) {
            warn!(error = %e, "could not display commit graph");
        }
    }

    fn verify(&mut self) -> SessionResult<()> {
        match self.cfg.test_command.clone() {
            Some(command) => {
                let code = self.vcs.run_test_command(&command)?;
                if code != 0 {
                    return Err(SessionError::TestCommandFailed { command, code });
                }
            }
            None => {
                self.operator.info(
                    "Dropping you on a shell so you can try building/testing the merged source.",
                );
                self.operator
                    .info("Run 'git diff HEAD~' to show the changes being merged.");
                self.operator.info("Type 'exit' when done.");
                self.vcs.interactive_shell(&self.cfg.pull)?;
            }
        }

        // Show the full change being merged, then compare against the
        // service's own merge. A divergence is advisory: benign ones
        // happen, so the operator decides.
        let base_range = format!(
            "{}..{}",
            self.cfg.base_branch(),
            self.cfg.local_merge_branch()
        );
        if let Err(e) = self.vcs.show_diff(&base_range) {
            warn!(error = %e, "could not display merge diff");
        }
        if self
            .vcs
            .diff_differs(&self.cfg.remote_merge_branch(), &self.cfg.local_merge_branch())?
        {
            self.operator
                .warn("WARNING: merge differs from github!");
            let reply = self.operator.prompt("Type 'ignore' to continue.")?;
            if reply.trim().eq_ignore_ascii_case("ignore") {
                self.operator.info("Difference with github ignored.");
            } else {
                return Err(SessionError::DivergenceRejected);
            }
        }
        self.enter(SessionState::Verified);
        Ok(())
    }

    fn post_fingerprint(&mut self) -> SessionResult<()> {
        let second = self.vcs.tree_fingerprint("HEAD")?;
        // `verify` runs after `pre_fingerprint`, so the baseline exists.
        let baseline = self.baseline.as_ref().ok_or(SessionError::TreeMutated)?;
        if &second != baseline {
            return Err(SessionError::TreeMutated);
        }
        self.enter(SessionState::PostFingerprinted);
        Ok(())
    }

    fn finalize_message(&mut self) -> SessionResult<()> {
        let records = self.comments.comments_and_reviews(&self.cfg.pull)?;
        let head = self.head_commit.as_ref().ok_or(SessionError::MergeFailed)?;
        self.acks = extract_acks(head, &records);
        info!(acks = self.acks.len(), "collected acknowledgements");

        let baseline = self.baseline.as_ref().ok_or(SessionError::TreeMutated)?;
        self.merge_message = message::finalize(&self.merge_message, &self.acks, baseline);
        self.vcs
            .amend_message(&self.merge_message)
            .map_err(|_| SessionError::MessageAmendFailure)?;
        // Confirm the amend actually stuck.
        let subject = self.vcs.head_subject()?;
        if subject.trim_end() != message::summary_line(&self.cfg.pull, &self.cfg.title).trim_end() {
            return Err(SessionError::MessageAmendFailure);
        }
        self.enter(SessionState::MessageFinalized);
        Ok(())
    }

    fn sign(&mut self) -> SessionResult<()> {
        self.present(true);
        loop {
            let reply = self
                .operator
                .prompt("Type 's' to sign off on the above merge, or 'x' to reject and exit.")?;
            match reply.trim().to_lowercase().as_str() {
                "s" => match self.vcs.amend_signed() {
                    Ok(()) => break,
                    // Signing hardware and agents routinely need a retry.
                    Err(e) => self
                        .operator
                        .warn(&format!("Error while signing ({e}), asking again.")),
                },
                "x" => {
                    self.operator.info("Not signing off on merge, exiting.");
                    return Err(SessionError::Rejected);
                }
                _ => {}
            }
        }
        self.enter(SessionState::Signed);
        Ok(())
    }

    fn push(&mut self) -> SessionResult<()> {
        // The local target branch carries the result even if the operator
        // declines to push.
        self.vcs.checkout(&self.cfg.target_branch)?;
        self.vcs.reset_hard(&self.cfg.local_merge_branch())?;

        let mut destinations = vec![self.cfg.host_repo.clone()];
        destinations.extend(self.cfg.push_mirrors.iter().cloned());
        let refspec = format!("refs/heads/{}", self.cfg.target_branch);
        loop {
            let reply = self.operator.prompt(&format!(
                "Type 'push' to push the result to {}, branch {}, or 'x' to exit without pushing.",
                destinations.join(", "),
                self.cfg.target_branch
            ))?;
            match reply.trim().to_lowercase().as_str() {
                "push" => {
                    for remote in &destinations {
                        self.vcs.push(remote, &refspec).map_err(|source| {
                            SessionError::PushFailure {
                                remote: remote.clone(),
                                source,
                            }
                        })?;
                    }
                    break;
                }
                "x" => return Err(SessionError::Rejected),
                _ => {}
            }
        }
        self.enter(SessionState::Pushed);
        Ok(())
    }

    /// Unconditional teardown: restore the target branch, drop the four
    /// ephemeral refs. Individual failures are ignored — a ref that was
    /// never created has nothing to delete.
    fn cleanup(&mut self) {
        if let Err(e) = self.vcs.checkout(&self.cfg.target_branch) {
            warn!(error = %e, branch = %self.cfg.target_branch, "cleanup checkout failed");
        }
        self.vcs.delete_branch(&self.cfg.head_branch());
        self.vcs.delete_branch(&self.cfg.base_branch());
        self.vcs.delete_branch(&self.cfg.remote_merge_branch());
        self.vcs.delete_branch(&self.cfg.local_merge_branch());
        self.enter(SessionState::CleanedUp);
    }
}
