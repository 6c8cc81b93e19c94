//! # clonectl-git
//!
//! Thin wrapper around the system `git` binary.
//!
//! - [`Git`] runs `git init --bare` and `git clone` as blocking subprocesses.
//! - [`GitBackend`] is the seam the control layer talks to.
//! - [`probe`] holds the filesystem checks used to decide what to run.

pub mod command;
pub mod error;
pub mod probe;

pub use command::{Git, GitBackend};
pub use error::GitError;
pub use probe::{is_git_repository, is_local_path};
