//! Ordered, name-keyed collection of control entries.
//!
//! Entries keep insertion order; bulk updates run in that order. Names are
//! unique: every registration path rejects a name that is already present,
//! and config loads are all-or-nothing.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use clonectl_git::{Git, GitBackend};

use crate::config::{self, ConfigFormat};
use crate::error::{io_err, ControlError};
use crate::types::{ApplyOutcome, ControlEntry, ControlName, ControlsConfig};

// ---------------------------------------------------------------------------
// Update options and report
// ---------------------------------------------------------------------------

/// Knobs for [`CloneManager::update_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Overwrite every target, regardless of each entry's `force_overwrite`.
    pub force: bool,
    /// Continue past failures and record them instead of aborting.
    pub keep_going: bool,
}

/// Outcome of one entry within a bulk update.
#[derive(Debug)]
pub struct ControlReport {
    pub name: ControlName,
    pub result: Result<ApplyOutcome, ControlError>,
}

/// Per-entry results of a bulk update, in insertion order.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub controls: Vec<ControlReport>,
}

impl UpdateReport {
    pub fn succeeded(&self) -> usize {
        self.controls.iter().filter(|c| c.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.controls.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ControlName, &ControlError)> {
        self.controls
            .iter()
            .filter_map(|c| c.result.as_ref().err().map(|e| (&c.name, e)))
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Holds control entries and applies them through a [`GitBackend`].
pub struct CloneManager {
    controls: Vec<ControlEntry>,
    git: Box<dyn GitBackend>,
}

impl Default for CloneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CloneManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneManager")
            .field("controls", &self.controls)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CloneManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CloneManager({} controls)", self.controls.len())
    }
}

impl CloneManager {
    /// Manager backed by `git` on PATH.
    pub fn new() -> Self {
        Self::with_git(Git::default())
    }

    pub fn with_git(git: impl GitBackend + 'static) -> Self {
        Self {
            controls: Vec::new(),
            git: Box::new(git),
        }
    }

    // -- registration -------------------------------------------------------

    /// Register one entry. Fails on empty fields or a name already present.
    pub fn append_control(&mut self, entry: ControlEntry) -> Result<(), ControlError> {
        if let Err(reason) = entry.check_fields() {
            return Err(ControlError::InvalidEntry {
                entry: format!("'{}'", entry.name()),
                reason: reason.to_string(),
            });
        }
        if self.has_control_name(entry.name().as_str()) {
            return Err(ControlError::DuplicateName {
                name: entry.name().0.clone(),
            });
        }
        debug!(control = %entry, "registered control");
        self.controls.push(entry);
        Ok(())
    }

    /// Register every entry of an already-parsed config.
    ///
    /// Nothing is registered unless the whole batch is valid and none of its
    /// names collide with registered ones. Returns the number added.
    pub fn load_from_config(&mut self, config: ControlsConfig) -> Result<usize, ControlError> {
        config.validate()?;
        if let Some(clash) = config
            .controls
            .iter()
            .find(|c| self.has_control_name(c.name().as_str()))
        {
            error!(name = %clash.name(), "control name already registered");
            return Err(ControlError::DuplicateName {
                name: clash.name().0.clone(),
            });
        }

        let loaded = config.controls.len();
        self.controls.extend(config.controls);
        info!(loaded, "loaded controls");
        Ok(loaded)
    }

    /// Load from an in-memory JSON value shaped like the config file.
    pub fn load_from_value(&mut self, value: serde_json::Value) -> Result<usize, ControlError> {
        self.load_from_config(ControlsConfig::from_value(value)?)
    }

    /// Load from a JSON document.
    pub fn load_from_str(&mut self, json: &str) -> Result<usize, ControlError> {
        self.load_from_config(ControlsConfig::from_json_str(json)?)
    }

    /// Load from a JSON config file.
    pub fn load_from_json(&mut self, path: &Path) -> Result<usize, ControlError> {
        if ConfigFormat::from_path(path) != ConfigFormat::Json {
            warn!(path = %path.display(), "non-json extension; parsing as JSON anyway");
        }
        let contents = read_existing(path)?;
        let parsed: ControlsConfig =
            serde_json::from_str(&contents).map_err(|source| ControlError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        self.load_from_config(parsed)
    }

    /// Load from a JSON or YAML config file, chosen by extension.
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize, ControlError> {
        self.load_from_config(config::read_config(path)?)
    }

    /// Unregister by name, returning the entry if it was present.
    pub fn remove_control(&mut self, name: &str) -> Option<ControlEntry> {
        match self.controls.iter().position(|c| c.name().as_str() == name) {
            Some(index) => {
                let removed = self.controls.remove(index);
                debug!(control = %removed, "removed control");
                Some(removed)
            }
            None => {
                warn!(name, "no control to remove");
                None
            }
        }
    }

    pub fn clear_controls(&mut self) {
        let count = self.controls.len();
        self.controls.clear();
        info!(count, "cleared controls");
    }

    // -- accessors ----------------------------------------------------------

    pub fn count(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> impl Iterator<Item = &ControlEntry> {
        self.controls.iter()
    }

    pub fn get_control_names(&self) -> Vec<ControlName> {
        self.controls.iter().map(|c| c.name().clone()).collect()
    }

    pub fn get_control_by_name(&self, name: &str) -> Option<&ControlEntry> {
        self.controls.iter().find(|c| c.name().as_str() == name)
    }

    pub fn has_control_name(&self, name: &str) -> bool {
        self.get_control_by_name(name).is_some()
    }

    // -- persistence --------------------------------------------------------

    pub fn to_config(&self) -> ControlsConfig {
        ControlsConfig {
            controls: self.controls.clone(),
        }
    }

    /// Write all entries as pretty JSON, creating parent directories.
    pub fn save_to_json(&self, path: &Path) -> Result<(), ControlError> {
        config::write_config_as(path, &self.to_config(), ConfigFormat::Json)?;
        info!(count = self.controls.len(), path = %path.display(), "saved controls");
        Ok(())
    }

    /// Write all entries in the format implied by the extension.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ControlError> {
        config::write_config(path, &self.to_config())?;
        info!(count = self.controls.len(), path = %path.display(), "saved controls");
        Ok(())
    }

    // -- validation ---------------------------------------------------------

    /// Cross-entry checks that parsing cannot catch. Empty means no problems.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut reported: HashSet<PathBuf> = HashSet::new();
        for control in &self.controls {
            let target = control.target_path().to_path_buf();
            if !seen.insert(target.clone()) && reported.insert(target.clone()) {
                problems.push(format!(
                    "target path {} is used by more than one control",
                    target.display()
                ));
            }
        }

        for control in &self.controls {
            if control.target_contains_source() {
                problems.push(format!(
                    "{}: target path {} contains its source repository {}",
                    control.name(),
                    control.target_path().display(),
                    control.repository_path()
                ));
            }
            if control.is_local_repository() && !control.repository_exists() {
                let repo = Path::new(control.repository_path());
                let parent_missing = repo
                    .parent()
                    .map(|p| !p.as_os_str().is_empty() && !p.exists())
                    .unwrap_or(false);
                if parent_missing {
                    problems.push(format!(
                        "{}: parent directory of repository {} does not exist",
                        control.name(),
                        repo.display()
                    ));
                }
            }
        }

        problems
    }

    // -- execution ----------------------------------------------------------

    /// Apply every entry in insertion order, stopping at the first failure.
    pub fn update(&self) -> Result<UpdateReport, ControlError> {
        self.update_with(UpdateOptions::default())
    }

    /// Apply every entry in insertion order.
    ///
    /// Without `keep_going` the first failure is returned and later entries
    /// are not attempted. With it, failures are recorded in the report.
    pub fn update_with(&self, options: UpdateOptions) -> Result<UpdateReport, ControlError> {
        self.update_with_progress(options, |_| {})
    }

    /// Like [`update_with`](Self::update_with), calling `on_result` for each
    /// entry as it finishes. Entries that completed before an aborting
    /// failure have already been passed to `on_result`.
    pub fn update_with_progress(
        &self,
        options: UpdateOptions,
        mut on_result: impl FnMut(&ControlReport),
    ) -> Result<UpdateReport, ControlError> {
        let mut report = UpdateReport::default();
        if self.controls.is_empty() {
            warn!("no controls registered");
            return Ok(report);
        }

        let total = self.controls.len();
        info!(total, "updating controls");

        for (i, control) in self.controls.iter().enumerate() {
            let position = i + 1;
            info!(position, total, control = %control, "starting");
            match control.apply(&*self.git, options.force) {
                Ok(outcome) => {
                    info!(position, total, name = %control.name(), clone = %outcome.clone, "succeeded");
                    let entry = ControlReport {
                        name: control.name().clone(),
                        result: Ok(outcome),
                    };
                    on_result(&entry);
                    report.controls.push(entry);
                }
                Err(err) => {
                    error!(position, total, name = %control.name(), error = %err, "failed");
                    if !options.keep_going {
                        return Err(err);
                    }
                    let entry = ControlReport {
                        name: control.name().clone(),
                        result: Err(err),
                    };
                    on_result(&entry);
                    report.controls.push(entry);
                }
            }
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "update finished"
        );
        for (name, err) in report.failures() {
            warn!(%name, error = %err, "control failed");
        }
        Ok(report)
    }

    /// Apply a single entry by name.
    pub fn update_by_name(&self, name: &str) -> Result<ApplyOutcome, ControlError> {
        self.update_by_name_with(name, false)
    }

    /// Apply a single entry by name, optionally forcing an overwrite.
    pub fn update_by_name_with(
        &self,
        name: &str,
        force: bool,
    ) -> Result<ApplyOutcome, ControlError> {
        let control = self
            .get_control_by_name(name)
            .ok_or_else(|| ControlError::UnknownControl {
                name: name.to_string(),
            })?;

        info!(name, "updating single control");
        control.apply(&*self.git, force).inspect_err(|err| {
            error!(name, error = %err, "control failed");
        })
    }
}

fn read_existing(path: &Path) -> Result<String, ControlError> {
    if !path.exists() {
        return Err(ControlError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::tests::FakeGit;
    use crate::types::CloneAction;
    use serde_json::json;
    use tempfile::TempDir;

    fn manager() -> CloneManager {
        CloneManager::with_git(FakeGit::default())
    }

    #[test]
    fn append_rejects_duplicate_name() {
        let mut m = manager();
        m.append_control(ControlEntry::new("a", "r", "t1")).unwrap();
        let err = m
            .append_control(ControlEntry::new("a", "r2", "t2"))
            .unwrap_err();
        assert!(matches!(err, ControlError::DuplicateName { .. }));
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn append_rejects_empty_fields() {
        let mut m = manager();
        let err = m.append_control(ControlEntry::new("a", "", "t")).unwrap_err();
        assert!(matches!(err, ControlError::InvalidEntry { .. }));
        assert!(m.is_empty());
    }

    #[test]
    fn load_is_all_or_nothing_on_collision() {
        let mut m = manager();
        m.append_control(ControlEntry::new("b", "r", "t")).unwrap();
        let err = m
            .load_from_value(json!({"controls": [
                {"name": "a", "repository_path": "r", "target_path": "ta"},
                {"name": "b", "repository_path": "r", "target_path": "tb"},
            ]}))
            .unwrap_err();
        assert!(matches!(err, ControlError::DuplicateName { ref name } if name == "b"));
        assert_eq!(m.get_control_names(), vec![ControlName::from("b")]);
    }

    #[test]
    fn names_keep_insertion_order() {
        let mut m = manager();
        m.load_from_str(
            r#"{"controls": [
                {"name": "zeta", "repository_path": "r", "target_path": "tz"},
                {"name": "alpha", "repository_path": "r", "target_path": "ta"},
                {"name": "mid", "repository_path": "r", "target_path": "tm"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<String> = m.get_control_names().into_iter().map(|n| n.0).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn remove_and_clear() {
        let mut m = manager();
        m.append_control(ControlEntry::new("a", "r", "ta")).unwrap();
        m.append_control(ControlEntry::new("b", "r", "tb")).unwrap();
        assert_eq!(m.remove_control("a").map(|c| c.name().0.clone()), Some("a".into()));
        assert!(m.remove_control("a").is_none());
        assert!(!m.has_control_name("a"));
        m.clear_controls();
        assert_eq!(m.count(), 0);
    }

    #[test]
    fn update_on_empty_manager_is_ok() {
        let report = manager().update().expect("update");
        assert!(report.controls.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn update_by_unknown_name_fails() {
        let err = manager().update_by_name("ghost").unwrap_err();
        assert!(matches!(err, ControlError::UnknownControl { ref name } if name == "ghost"));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn update_by_name_applies_only_that_entry() {
        let work = TempDir::new().unwrap();
        let mut m = manager();
        m.append_control(ControlEntry::new("a", "https://e.com/a.git", work.path().join("a")))
            .unwrap();
        m.append_control(ControlEntry::new("b", "https://e.com/b.git", work.path().join("b")))
            .unwrap();

        let outcome = m.update_by_name("b").unwrap();
        assert_eq!(outcome.clone, CloneAction::Cloned);
        assert!(work.path().join("b").join(".git").exists());
        assert!(!work.path().join("a").exists());
    }

    #[test]
    fn first_failure_aborts_remaining_entries() {
        let work = TempDir::new().unwrap();
        let mut m = CloneManager::with_git(FakeGit {
            fail_clone_of: Some("https://e.com/bad.git".to_string()),
            ..FakeGit::default()
        });
        m.append_control(ControlEntry::new("ok", "https://e.com/ok.git", work.path().join("ok")))
            .unwrap();
        m.append_control(ControlEntry::new("bad", "https://e.com/bad.git", work.path().join("bad")))
            .unwrap();
        m.append_control(ControlEntry::new("later", "https://e.com/l.git", work.path().join("later")))
            .unwrap();

        assert!(m.update().is_err());
        assert!(work.path().join("ok").join(".git").exists());
        assert!(!work.path().join("later").exists(), "later entry must not run");
    }

    #[test]
    fn progress_sees_successes_before_abort() {
        let work = TempDir::new().unwrap();
        let mut m = CloneManager::with_git(FakeGit {
            fail_clone_of: Some("https://e.com/bad.git".to_string()),
            ..FakeGit::default()
        });
        m.append_control(ControlEntry::new("ok", "https://e.com/ok.git", work.path().join("ok")))
            .unwrap();
        m.append_control(ControlEntry::new("bad", "https://e.com/bad.git", work.path().join("bad")))
            .unwrap();

        let mut seen = Vec::new();
        let result = m.update_with_progress(UpdateOptions::default(), |c| {
            seen.push((c.name.0.clone(), c.result.is_ok()));
        });
        assert!(result.is_err());
        assert_eq!(seen, [("ok".to_string(), true)]);
    }

    #[test]
    fn keep_going_records_every_failure() {
        let work = TempDir::new().unwrap();
        let mut m = CloneManager::with_git(FakeGit {
            fail_clone_of: Some("https://e.com/bad.git".to_string()),
            ..FakeGit::default()
        });
        m.append_control(ControlEntry::new("bad", "https://e.com/bad.git", work.path().join("bad")))
            .unwrap();
        m.append_control(ControlEntry::new("ok", "https://e.com/ok.git", work.path().join("ok")))
            .unwrap();

        let report = m
            .update_with(UpdateOptions {
                keep_going: true,
                ..UpdateOptions::default()
            })
            .expect("keep_going returns a report");
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(|(n, _)| n.0.clone()).collect();
        assert_eq!(failed, ["bad"]);
        assert!(work.path().join("ok").join(".git").exists());
    }

    #[test]
    fn validate_flags_shared_targets_and_missing_parents() {
        let work = TempDir::new().unwrap();
        let mut m = manager();
        let shared = work.path().join("shared");
        let orphan_repo = work.path().join("no-such-parent").join("repo.git");
        m.append_control(ControlEntry::new("a", "https://e.com/a.git", &shared)).unwrap();
        m.append_control(ControlEntry::new("b", "https://e.com/b.git", &shared)).unwrap();
        m.append_control(ControlEntry::new(
            "c",
            orphan_repo.to_string_lossy().into_owned(),
            work.path().join("c"),
        ))
        .unwrap();

        let problems = m.validate();
        assert_eq!(problems.len(), 2, "got: {problems:?}");
        assert!(problems[0].contains("more than one control"));
        assert!(problems[1].starts_with("c:"));
    }

    #[test]
    fn validate_flags_target_containing_source() {
        let work = TempDir::new().unwrap();
        let target = work.path().join("t");
        std::fs::create_dir(&target).unwrap();
        let mut m = manager();
        m.append_control(ControlEntry::new(
            "nested",
            target.join("origin.git").to_string_lossy().into_owned(),
            &target,
        ))
        .unwrap();

        let problems = m.validate();
        assert_eq!(problems.len(), 1, "got: {problems:?}");
        assert!(problems[0].starts_with("nested:"));
        assert!(problems[0].contains("contains its source repository"));
    }

    #[test]
    fn display_counts_controls() {
        let mut m = manager();
        m.append_control(ControlEntry::new("a", "r", "t")).unwrap();
        assert_eq!(m.to_string(), "CloneManager(1 controls)");
    }
}
