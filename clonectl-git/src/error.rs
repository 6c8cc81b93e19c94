//! Error types for clonectl-git.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// All errors that can arise while driving the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git program could not be located.
    #[error("git executable not found: '{program}' (is git installed and on PATH?)")]
    NotFound { program: PathBuf },

    /// The process could not be started for another reason.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git ran but exited non-zero.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Filesystem preparation around a git call failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
