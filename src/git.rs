//! # Git Module
//!
//! Repository inspection for the branch segment.
//!
//! Two backends implement [`GitProbe`]:
//!
//! - [`CommandGit`] runs the `git` executable once per query, with a bounded wait
//! - `GixGit` (feature `gix`) reads the repository in-process via gix
//!
//! [`read_git_status`] drives either one and collapses any failure into `None`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::models::GitStatus;

/// Label shown when HEAD does not point at a branch.
pub const DETACHED_LABEL: &str = "HEAD";

/// Sleep between exit checks while waiting on a git child.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed waiting on git: {0}")]
    Wait(#[source] std::io::Error),
    #[error("git {command} exited with {status}")]
    Failed { command: String, status: ExitStatus },
    #[error("git {command} did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("git {command} produced non-UTF-8 output")]
    Utf8 { command: String },
    #[cfg(feature = "gix")]
    #[error("repository access failed: {0}")]
    Gix(String),
}

/// Narrow capability over a git repository, so the formatter never shells out directly.
pub trait GitProbe {
    /// Whether `dir` lies inside a work tree.
    fn is_repo(&self, dir: &Path) -> Result<bool, GitError>;
    /// Checked-out branch, `None` when detached.
    fn branch_name(&self, dir: &Path) -> Result<Option<String>, GitError>;
    /// Whether the work tree has uncommitted changes.
    fn is_dirty(&self, dir: &Path) -> Result<bool, GitError>;
}

/// Run the three queries in order. Empty `dir`, "not a repo", and every error give `None`.
pub fn read_git_status(probe: &dyn GitProbe, dir: &str) -> Option<GitStatus> {
    if dir.is_empty() {
        return None;
    }
    let dir = Path::new(dir);
    match inspect(probe, dir) {
        Ok(status) => status,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "git segment dropped");
            None
        }
    }
}

fn inspect(probe: &dyn GitProbe, dir: &Path) -> Result<Option<GitStatus>, GitError> {
    if !probe.is_repo(dir)? {
        return Ok(None);
    }
    let branch = probe
        .branch_name(dir)?
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DETACHED_LABEL.to_string());
    let dirty = probe.is_dirty(dir)?;
    Ok(Some(GitStatus { branch, dirty }))
}

/// Shell-out backend. Each query is its own `git -C <dir> ...` child process.
#[derive(Debug, Clone)]
pub struct CommandGit {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Default for CommandGit {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            timeout: None,
        }
    }
}

impl CommandGit {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Use a specific executable instead of `git` from the search path.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Run `git -C dir <args>` and return trimmed stdout. Non-zero exit is an error.
    fn query(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .arg("-C")
            .arg(dir)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(GitError::Spawn)?;

        // Drain stdout on a side thread so a chatty child cannot block on a full pipe
        // while we poll for its exit.
        let (tx, rx) = mpsc::channel();
        if let Some(mut out) = child.stdout.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = out.read_to_end(&mut buf);
                let _ = tx.send(buf);
            });
        } else {
            drop(tx);
        }

        let status = loop {
            match child.try_wait().map_err(GitError::Wait)? {
                Some(status) => break status,
                None => {
                    if let Some(limit) = self.timeout {
                        if started.elapsed() >= limit {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(GitError::Timeout {
                                command,
                                timeout: limit,
                            });
                        }
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        // A grandchild holding the pipe open keeps EOF away; the deadline still applies.
        let stdout = match self.timeout {
            Some(limit) => match rx.recv_timeout(limit.saturating_sub(started.elapsed())) {
                Ok(buf) => buf,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(GitError::Timeout {
                        command,
                        timeout: limit,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => Vec::new(),
            },
            None => rx.recv().unwrap_or_default(),
        };
        tracing::debug!(
            command = %command,
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = status.success(),
            "git query finished"
        );
        if !status.success() {
            return Err(GitError::Failed { command, status });
        }
        let text = String::from_utf8(stdout).map_err(|_| GitError::Utf8 {
            command: command.clone(),
        })?;
        Ok(text.trim().to_string())
    }
}

impl GitProbe for CommandGit {
    fn is_repo(&self, dir: &Path) -> Result<bool, GitError> {
        Ok(self.query(dir, &["rev-parse", "--is-inside-work-tree"])? == "true")
    }

    fn branch_name(&self, dir: &Path) -> Result<Option<String>, GitError> {
        let name = self.query(dir, &["branch", "--show-current"])?;
        Ok(Some(name).filter(|n| !n.is_empty()))
    }

    fn is_dirty(&self, dir: &Path) -> Result<bool, GitError> {
        Ok(!self.query(dir, &["status", "--porcelain"])?.is_empty())
    }
}

/// In-process backend built on gix. Untracked files do not make the tree dirty here.
#[cfg(feature = "gix")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GixGit;

#[cfg(feature = "gix")]
impl GixGit {
    fn open(dir: &Path) -> Result<gix::Repository, GitError> {
        gix::discover(dir).map_err(|e| GitError::Gix(e.to_string()))
    }
}

#[cfg(feature = "gix")]
impl GitProbe for GixGit {
    fn is_repo(&self, dir: &Path) -> Result<bool, GitError> {
        // Bare repositories have no work tree, matching `rev-parse --is-inside-work-tree`.
        Ok(Self::open(dir)?.work_dir().is_some())
    }

    fn branch_name(&self, dir: &Path) -> Result<Option<String>, GitError> {
        let repo = Self::open(dir)?;
        let head = repo.head().map_err(|e| GitError::Gix(e.to_string()))?;
        Ok(head.referent_name().map(|name| name.shorten().to_string()))
    }

    fn is_dirty(&self, dir: &Path) -> Result<bool, GitError> {
        Self::open(dir)?
            .is_dirty()
            .map_err(|e| GitError::Gix(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Scripted probe; counts calls so tests can see short-circuiting.
    #[derive(Default)]
    struct FakeProbe {
        repo: Option<bool>,
        branch: Option<Option<String>>,
        dirty: Option<bool>,
        calls: Cell<usize>,
    }

    fn failure() -> GitError {
        GitError::Spawn(std::io::Error::new(std::io::ErrorKind::NotFound, "git"))
    }

    impl GitProbe for FakeProbe {
        fn is_repo(&self, _dir: &Path) -> Result<bool, GitError> {
            self.calls.set(self.calls.get() + 1);
            self.repo.ok_or_else(failure)
        }
        fn branch_name(&self, _dir: &Path) -> Result<Option<String>, GitError> {
            self.calls.set(self.calls.get() + 1);
            self.branch.clone().ok_or_else(failure)
        }
        fn is_dirty(&self, _dir: &Path) -> Result<bool, GitError> {
            self.calls.set(self.calls.get() + 1);
            self.dirty.ok_or_else(failure)
        }
    }

    fn probe(repo: bool, branch: Option<&str>, dirty: bool) -> FakeProbe {
        FakeProbe {
            repo: Some(repo),
            branch: Some(branch.map(str::to_string)),
            dirty: Some(dirty),
            ..FakeProbe::default()
        }
    }

    #[test]
    fn test_empty_dir_skips_probe() {
        let p = probe(true, Some("main"), false);
        assert_eq!(read_git_status(&p, ""), None);
        assert_eq!(p.calls.get(), 0);
    }

    #[test]
    fn test_clean_and_dirty() {
        let clean = read_git_status(&probe(true, Some("main"), false), "/repo");
        assert_eq!(
            clean,
            Some(GitStatus {
                branch: "main".to_string(),
                dirty: false
            })
        );
        let dirty = read_git_status(&probe(true, Some("feat/x"), true), "/repo");
        assert_eq!(dirty.map(|s| (s.branch, s.dirty)), Some(("feat/x".to_string(), true)));
    }

    #[test]
    fn test_detached_head_label() {
        let status = read_git_status(&probe(true, None, false), "/repo");
        assert_eq!(status.map(|s| s.branch).as_deref(), Some(DETACHED_LABEL));
        let status = read_git_status(&probe(true, Some(""), false), "/repo");
        assert_eq!(status.map(|s| s.branch).as_deref(), Some(DETACHED_LABEL));
    }

    #[test]
    fn test_not_a_repo_stops_early() {
        let p = probe(false, Some("main"), true);
        assert_eq!(read_git_status(&p, "/tmp"), None);
        assert_eq!(p.calls.get(), 1);
    }

    #[test]
    fn test_any_failure_drops_segment() {
        let p = FakeProbe::default();
        assert_eq!(read_git_status(&p, "/repo"), None);

        let p = FakeProbe {
            repo: Some(true),
            branch: None,
            dirty: Some(false),
            ..FakeProbe::default()
        };
        assert_eq!(read_git_status(&p, "/repo"), None);

        let p = FakeProbe {
            repo: Some(true),
            branch: Some(Some("main".to_string())),
            dirty: None,
            ..FakeProbe::default()
        };
        assert_eq!(read_git_status(&p, "/repo"), None);
    }

    #[test]
    fn test_missing_executable_is_swallowed() {
        let git = CommandGit::new(Some(Duration::from_secs(1)))
            .with_program("/nonexistent/bin/git-statusline-test");
        assert!(matches!(
            git.is_repo(Path::new("/tmp")),
            Err(GitError::Spawn(_))
        ));
        assert_eq!(read_git_status(&git, "/tmp"), None);
    }
}
