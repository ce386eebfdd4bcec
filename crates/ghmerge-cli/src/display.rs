//! Terminal-facing operator implementation.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use ghmerge_session::{MergeDetails, Operator, SessionError, SessionResult};

/// Pretty format for the commit graph shown to the operator.
const COMMIT_FORMAT: &str = "%C(bold blue)%H%Creset %s %C(cyan)(%an)%Creset%C(green)%d%Creset";

/// The real operator: prompts on stderr, reads replies from stdin, and
/// renders merge details with terminal colors.
#[derive(Default)]
pub struct TerminalOperator;

impl TerminalOperator {
    pub fn new() -> Self {
        Self
    }
}

impl Operator for TerminalOperator {
    fn prompt(&mut self, text: &str) -> SessionResult<String> {
        eprint!("{text} ");
        io::stderr().flush()?;
        let mut reply = String::new();
        let n = io::stdin().lock().read_line(&mut reply)?;
        if n == 0 {
            return Err(SessionError::Input(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed at prompt",
            )));
        }
        eprintln!();
        Ok(reply.trim().to_string())
    }

    fn present(&mut self, details: &MergeDetails<'_>) {
        println!(
            "{} {} into {}",
            details.pull.to_string().bright_cyan().bold(),
            details.title,
            details.target_branch.bright_cyan().bold()
        );
        if let Some(acks) = details.acks {
            if acks.is_empty() {
                println!("{}", "Top commit has no ACKs!".bright_red().bold());
            } else {
                println!("{}", "ACKs:".bright_cyan().bold());
                for (author, line) in acks.iter() {
                    println!("* {} {}", line, format!("({author})").cyan());
                }
            }
        }
        if let Some(message) = details.message {
            // Mentions would notify people from the final signed commit;
            // HTML comments can hide content in the rendered view. Flag
            // both and show where they sit.
            let mut show = false;
            if message.contains('@') {
                println!("{}", "Merge message contains an @!".bright_red().bold());
                show = true;
            }
            if message.contains("<!-") {
                println!(
                    "{}",
                    "Merge message contains an html comment!".bright_red().bold()
                );
                show = true;
            }
            if show {
                let highlighted = message
                    .replace('@', &"@".bright_magenta().to_string())
                    .replace("<!-", &"<!-".bright_magenta().to_string());
                println!("{}", "-".repeat(75));
                println!("{highlighted}");
                println!("{}", "-".repeat(75));
            }
        }
    }

    fn info(&mut self, text: &str) {
        eprintln!("{text}");
    }

    fn warn(&mut self, text: &str) {
        eprintln!("{}", text.bright_red().bold());
    }

    fn commit_format(&self) -> &str {
        COMMIT_FORMAT
    }
}
