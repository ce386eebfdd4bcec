use std::env;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use ghmerge_git::GitRunner;
use ghmerge_github::GithubClient;
use ghmerge_session::{GitSessionOps, MergeOrchestrator, SessionConfig, SessionError};
use ghmerge_types::PullRequestRef;
mod cli;
mod display;
mod settings;

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    init_tracing(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "ERROR:".bright_red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI-level failures, before a session starts.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] settings::SettingsError),
    #[error(transparent)]
    Git(#[from] ghmerge_git::GitError),
    #[error(transparent)]
    Fetch(#[from] ghmerge_github::FetchError),
    #[error(transparent)]
    Type(#[from] ghmerge_types::TypeError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("--repo-from is only supported for the master branch (resolved branch: {branch})")]
    RepoFromOffMaster { branch: String },
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Session(e) => e.exit_code() as u8,
            _ => 1,
        }
    }
}

fn run(args: cli::Cli) -> Result<(), CliError> {
    let git = match env::var_os("GIT") {
        Some(program) => GitRunner::with_program(program),
        None => GitRunner::new(),
    };
    // Every git operation, the test command, and the interactive shell run
    // at the working tree root regardless of where ghmerge was invoked.
    let toplevel = git.toplevel()?;
    let git = git.in_dir(toplevel);
    let settings = settings::Settings::from_git(&git)?;

    let repo_from = args
        .repo_from
        .clone()
        .unwrap_or_else(|| settings.repository.clone());
    let pull = PullRequestRef::new(&repo_from, args.pull)?;

    let client = GithubClient::new(settings.github_token.clone())?;
    let info = client.pull_request(&pull)?;

    // Branch precedence: command line, then configuration, then the branch
    // the pull request itself targets, then master.
    let branch = args
        .branch
        .clone()
        .or_else(|| settings.branch.clone())
        .or_else(|| {
            if info.base_ref.is_empty() {
                None
            } else {
                Some(info.base_ref.clone())
            }
        })
        .unwrap_or_else(|| "master".to_string());

    if repo_from != settings.repository && branch != "master" {
        return Err(CliError::RepoFromOffMaster { branch });
    }
    let push_mirrors = if branch == "master" {
        settings.push_mirrors.clone()
    } else {
        Vec::new()
    };

    let cfg = SessionConfig {
        host_repo: settings.host_url(&settings.repository),
        host_repo_from: settings.host_url(&repo_from),
        pull,
        title: info.title,
        description: info.body,
        target_branch: branch,
        push_mirrors,
        test_command: settings.test_command.clone(),
    };

    let mut session = MergeOrchestrator::new(
        GitSessionOps::new(git),
        client,
        display::TerminalOperator::new(),
        cfg,
    );
    session.run()?;
    Ok(())
}
