//! Applying a single control entry.
//!
//! `apply` walks two steps:
//!
//! 1. **Repository** — a local source that is not yet a repository is
//!    initialised bare; URLs are left for git to resolve.
//! 2. **Clone** — the target is cloned unless it already holds a
//!    repository. With overwrite on, an existing target is removed first.
//!
//! A target that exists, is not a repository and is not empty is refused
//! rather than clobbered. Overwrite never removes a target that holds the
//! entry's own local source.

use std::path::Path;

use tracing::{info, info_span, warn};

use clonectl_git::{is_git_repository, is_local_path, GitBackend};

use crate::error::{io_err, ControlError};
use crate::types::{ApplyOutcome, CloneAction, ControlEntry, RepositoryAction};

impl ControlEntry {
    /// `true` when the source is a directory on this machine.
    pub fn is_local_repository(&self) -> bool {
        is_local_path(&self.repository_path)
    }

    /// Local sources must be a repository on disk; remote ones are assumed
    /// to exist until clone proves otherwise.
    pub fn repository_exists(&self) -> bool {
        !self.is_local_repository() || is_git_repository(Path::new(&self.repository_path))
    }

    /// `true` when the target already holds a repository.
    pub fn clone_exists(&self) -> bool {
        is_git_repository(&self.target_path)
    }

    /// `true` when the source is local and lives at or under the target, so
    /// removing the target would take the source with it.
    pub fn target_contains_source(&self) -> bool {
        if !self.is_local_repository() {
            return false;
        }
        let repository = Path::new(&self.repository_path);
        if repository.starts_with(&self.target_path) {
            return true;
        }
        match (
            std::fs::canonicalize(repository),
            std::fs::canonicalize(&self.target_path),
        ) {
            (Ok(repository), Ok(target)) => repository.starts_with(target),
            _ => false,
        }
    }

    /// Step 1: make sure a local source exists as a repository.
    pub fn ensure_repository(
        &self,
        git: &dyn GitBackend,
    ) -> Result<RepositoryAction, ControlError> {
        if !self.is_local_repository() {
            return Ok(RepositoryAction::Remote);
        }
        if self.repository_exists() {
            info!(repository = %self.repository_path, "repository already exists");
            return Ok(RepositoryAction::Existing);
        }

        info!(repository = %self.repository_path, "creating bare repository");
        git.init_bare(Path::new(&self.repository_path))?;
        Ok(RepositoryAction::CreatedBare)
    }

    /// Step 2: clone into the target unless it already holds a repository.
    ///
    /// `force` replaces whatever is at the target.
    pub fn ensure_clone(
        &self,
        git: &dyn GitBackend,
        force: bool,
    ) -> Result<CloneAction, ControlError> {
        let target = self.target_path.as_path();
        let mut action = CloneAction::Cloned;

        if target.exists() {
            if force {
                if self.target_contains_source() {
                    return Err(ControlError::TargetContainsSource {
                        target: target.to_path_buf(),
                        repository: self.repository_path.clone().into(),
                    });
                }
                warn!(target = %target.display(), "removing existing target");
                remove_target(target)?;
                action = CloneAction::Recloned;
            } else if self.clone_exists() {
                info!(target = %target.display(), "clone already exists, skipping");
                return Ok(CloneAction::Skipped);
            } else if !is_empty_dir(target)? {
                return Err(ControlError::TargetOccupied {
                    path: target.to_path_buf(),
                });
            }
        }

        info!(
            repository = %self.repository_path,
            target = %target.display(),
            "cloning"
        );
        git.clone_repo(&self.repository_path, target)?;
        Ok(action)
    }

    /// Run both steps. The entry's own `force_overwrite` is combined with the
    /// run-wide `force` override.
    pub fn apply(&self, git: &dyn GitBackend, force: bool) -> Result<ApplyOutcome, ControlError> {
        let span = info_span!("control", name = %self.name);
        let _guard = span.enter();

        let repository = self.ensure_repository(git)?;
        let clone = self.ensure_clone(git, force || self.force_overwrite)?;
        info!(%clone, "control applied");
        Ok(ApplyOutcome { repository, clone })
    }
}

fn remove_target(target: &Path) -> Result<(), ControlError> {
    let result = if target.is_dir() {
        std::fs::remove_dir_all(target)
    } else {
        std::fs::remove_file(target)
    };
    result.map_err(|e| io_err(target, e))
}

fn is_empty_dir(path: &Path) -> Result<bool, ControlError> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = std::fs::read_dir(path).map_err(|e| io_err(path, e))?;
    Ok(entries.next().is_none())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
