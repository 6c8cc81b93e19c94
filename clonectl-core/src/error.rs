//! Error types for clonectl-core.

use std::path::PathBuf;

use thiserror::Error;

use clonectl_git::GitError;

/// All errors that can arise from loading, saving or applying controls.
#[derive(Debug, Error)]
pub enum ControlError {
    /// A git subprocess failed or could not be started.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Filesystem failure, with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-memory JSON value did not match the config schema.
    #[error("invalid control config: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON config file could not be parsed.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML config file could not be parsed or serialized.
    #[error("failed to parse YAML config at {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A required field is empty.
    #[error("invalid control entry {entry}: {reason}")]
    InvalidEntry { entry: String, reason: String },

    #[error("control name '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("no control named '{name}'")]
    UnknownControl { name: String },

    /// Target exists, is not a repository and is not empty.
    #[error("target {path} exists and is not a git repository; set force_overwrite to replace it")]
    TargetOccupied { path: PathBuf },

    /// Overwriting the target would delete the entry's own local source.
    #[error("target {target} contains the source repository {repository}; refusing to remove it")]
    TargetContainsSource { target: PathBuf, repository: PathBuf },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ControlError {
    ControlError::Io {
        path: path.into(),
        source,
    }
}
