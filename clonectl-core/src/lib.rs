//! clonectl core library — control entries, the manager, config files, errors.
//!
//! Public API surface:
//! - [`types`] — names, entries, config root and apply outcomes
//! - [`control`] — applying a single entry through a [`GitBackend`]
//! - [`manager`] — [`CloneManager`], the ordered named collection
//! - [`config`] — reading / writing config files
//! - [`error`] — [`ControlError`]

pub mod config;
pub mod control;
pub mod error;
pub mod manager;
pub mod types;

pub use clonectl_git::{Git, GitBackend, GitError};
pub use error::ControlError;
pub use manager::{CloneManager, ControlReport, UpdateOptions, UpdateReport};
pub use types::{ApplyOutcome, CloneAction, ControlEntry, ControlName, ControlsConfig, RepositoryAction};
