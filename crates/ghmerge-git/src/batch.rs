use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::error::{GitError, GitResult};
use crate::runner::GitRunner;

/// Header returned by the batch channel for one object request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobHeader {
    /// Object id echoed back by git.
    pub oid: String,
    /// Declared content size in bytes.
    pub size: u64,
}

/// A long-lived `git cat-file --batch` child process.
///
/// The fingerprint engine reads every blob of a tree through one of these
/// instead of spawning a process per file. The protocol is strictly
/// ordered: write one object id, read back its header and exactly the
/// declared number of content bytes plus a trailing newline, then the next
/// request. No requests are ever in flight concurrently.
pub struct BatchChannel {
    child: Child,
    /// `None` once the channel has been closed.
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl BatchChannel {
    /// Spawn the batch child in the runner's working directory.
    pub fn open(git: &GitRunner) -> GitResult<Self> {
        let mut cmd = Command::new(git.program());
        if let Some(dir) = git.workdir() {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(["cat-file", "--batch"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());
        let mut child = cmd.spawn().map_err(|source| GitError::Launch {
            command: "git cat-file --batch".into(),
            source,
        })?;
        // Both pipes were requested above, so take() cannot fail.
        let stdin = child.stdin.take().ok_or_else(|| GitError::Protocol {
            message: "batch child has no stdin".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| GitError::Protocol {
            message: "batch child has no stdout".into(),
        })?;
        debug!("opened cat-file batch channel");
        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }

    /// Request an object by id. Must be paired with [`Self::read_header`],
    /// [`Self::read_content`], and [`Self::read_trailer`], in that order,
    /// before the next request.
    pub fn request(&mut self, oid: &str) -> GitResult<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| GitError::Protocol {
            message: "request on a closed batch channel".into(),
        })?;
        stdin.write_all(oid.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }

    /// Read the `<oid> blob <size>` header for the previous request.
    pub fn read_header(&mut self) -> GitResult<BlobHeader> {
        let mut line = String::new();
        let n = self.stdout.read_line(&mut line)?;
        if n == 0 {
            return Err(GitError::Protocol {
                message: "batch channel closed before header".into(),
            });
        }
        let mut fields = line.split_ascii_whitespace();
        let oid = fields.next().unwrap_or("").to_string();
        match fields.next() {
            Some("blob") => {}
            Some("missing") => {
                return Err(GitError::Protocol {
                    message: format!("object {oid} missing from store"),
                })
            }
            other => {
                return Err(GitError::Protocol {
                    message: format!(
                        "expected blob header, got {:?} for {oid}",
                        other.unwrap_or("")
                    ),
                })
            }
        }
        let size = fields
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| GitError::Protocol {
                message: format!("unparseable size in header: {}", line.trim_end()),
            })?;
        Ok(BlobHeader { oid, size })
    }

    /// Stream exactly `size` content bytes into `sink` in chunks of at
    /// most `chunk` bytes. A short read is a fatal [`GitError::TruncatedRead`]:
    /// it means the channel is desynchronized or the store is corrupt, and
    /// retrying would only hash the wrong bytes.
    pub fn read_content(
        &mut self,
        size: u64,
        chunk: usize,
        mut sink: impl FnMut(&[u8]),
    ) -> GitResult<()> {
        let mut buf = vec![0u8; chunk.max(1)];
        let mut remaining = size;
        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            let got = self.stdout.read(&mut buf[..want])?;
            if got == 0 {
                return Err(GitError::TruncatedRead {
                    expected: size,
                    actual: size - remaining,
                });
            }
            sink(&buf[..got]);
            remaining -= got as u64;
        }
        Ok(())
    }

    /// Consume the newline that git emits after each object's content.
    pub fn read_trailer(&mut self) -> GitResult<()> {
        let mut nl = [0u8; 1];
        self.stdout.read_exact(&mut nl).map_err(|_| GitError::TruncatedRead {
            expected: 1,
            actual: 0,
        })?;
        if nl[0] != b'\n' {
            return Err(GitError::Protocol {
                message: format!("expected trailing newline, got byte {:#04x}", nl[0]),
            });
        }
        Ok(())
    }

    /// Close the request pipe and reap the child.
    pub fn close(mut self) -> GitResult<()> {
        // EOF on stdin tells git to exit.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(GitError::CommandFailed {
                command: "git cat-file --batch".into(),
                code: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        debug!("closed cat-file batch channel");
        Ok(())
    }
}

impl Drop for BatchChannel {
    fn drop(&mut self) {
        // Close-path already reaped; this covers early-error paths.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
