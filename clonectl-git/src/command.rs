//! Blocking `git` subprocess wrappers.
//!
//! Every call runs the configured program with stdin closed, stdout/stderr
//! captured and `GIT_TERMINAL_PROMPT=0` so a missing credential fails fast
//! instead of hanging on a prompt.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, info, instrument};

use crate::error::{io_err, GitError};
use crate::probe::is_git_repository;

/// Operations the control layer needs from git.
pub trait GitBackend {
    /// Make sure `path` is a repository, creating a bare one if needed.
    fn init_bare(&self, path: &Path) -> Result<(), GitError>;

    /// Clone `source` into `destination`, which must not hold a repository yet.
    fn clone_repo(&self, source: &str, destination: &Path) -> Result<(), GitError>;
}

/// The system `git` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    program: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Git {
    /// Use `program` (a bare name resolved on PATH, or a path) as git.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run<I, S>(&self, args: I) -> Result<Output, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let command = describe(&self.program, &args);

        let output = Command::new(&self.program)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => GitError::NotFound {
                    program: self.program.clone(),
                },
                _ => GitError::Spawn {
                    command: command.clone(),
                    source,
                },
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(%command, stdout = %stdout.trim(), "git stdout");
        }
        if !stderr.trim().is_empty() {
            debug!(%command, stderr = %stderr.trim(), "git stderr");
        }

        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl GitBackend for Git {
    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn init_bare(&self, path: &Path) -> Result<(), GitError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| io_err(path, e))?;
            debug!("created repository directory");
        }

        if is_git_repository(path) {
            debug!("already a repository, leaving untouched");
            return Ok(());
        }

        self.run([OsStr::new("init"), OsStr::new("--bare"), path.as_os_str()])?;
        info!("initialised bare repository");
        Ok(())
    }

    #[instrument(skip(self, destination), fields(destination = %destination.display()))]
    fn clone_repo(&self, source: &str, destination: &Path) -> Result<(), GitError> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
        }

        self.run([
            OsStr::new("clone"),
            OsStr::new(source),
            destination.as_os_str(),
        ])?;
        info!("cloned repository");
        Ok(())
    }
}

fn describe(program: &Path, args: &[std::ffi::OsString]) -> String {
    let mut parts = vec![program.to_string_lossy().into_owned()];
    parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}
