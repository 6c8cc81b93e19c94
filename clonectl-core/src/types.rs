//! Domain types for clonectl.
//!
//! Paths to clone targets are `PathBuf`; repository sources stay `String`
//! because they may be URLs that `Path` would mangle.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Unique key of a control entry inside a manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlName(pub String);

impl ControlName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ControlName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ControlName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Control entry
// ---------------------------------------------------------------------------

/// One named `repository_path -> target_path` clone directive.
///
/// Fields are private; an entry never changes after construction. Whether the
/// target has already been cloned is read from disk each time it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEntry {
    pub(crate) name: ControlName,
    pub(crate) repository_path: String,
    pub(crate) target_path: PathBuf,
    #[serde(default, skip_serializing_if = "is_false")]
    pub(crate) force_overwrite: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ControlEntry {
    pub fn new(
        name: impl Into<ControlName>,
        repository_path: impl Into<String>,
        target_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            repository_path: repository_path.into(),
            target_path: target_path.into(),
            force_overwrite: false,
        }
    }

    /// Replace an existing target on every apply instead of skipping it.
    pub fn with_force_overwrite(mut self, force_overwrite: bool) -> Self {
        self.force_overwrite = force_overwrite;
        self
    }

    pub fn name(&self) -> &ControlName {
        &self.name
    }

    pub fn repository_path(&self) -> &str {
        &self.repository_path
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn force_overwrite(&self) -> bool {
        self.force_overwrite
    }
}

impl fmt::Display for ControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} -> {})",
            self.name,
            self.repository_path,
            self.target_path.display()
        )
    }
}

// ---------------------------------------------------------------------------
// Config root
// ---------------------------------------------------------------------------

/// Root of a control config file: `{"controls": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ControlsConfig {
    pub controls: Vec<ControlEntry>,
}

// ---------------------------------------------------------------------------
// Apply outcomes
// ---------------------------------------------------------------------------

/// What happened to the source side of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryAction {
    /// Source is a URL; git resolves it during clone.
    Remote,
    /// Local source already was a repository.
    Existing,
    /// Local source was initialised with `git init --bare`.
    CreatedBare,
}

/// What happened to the target side of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneAction {
    /// Target did not exist (or was an empty directory) and was cloned.
    Cloned,
    /// Target existed and was removed before cloning again.
    Recloned,
    /// Target already was a repository; nothing ran.
    Skipped,
}

impl fmt::Display for CloneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneAction::Cloned => write!(f, "cloned"),
            CloneAction::Recloned => write!(f, "recloned"),
            CloneAction::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result of applying one control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub repository: RepositoryAction,
    pub clone: CloneAction,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_display() {
        assert_eq!(ControlName::from("docs").to_string(), "docs");
        assert_eq!(ControlName::from(String::from("x")), ControlName::from("x"));
    }

    #[test]
    fn force_overwrite_defaults_to_false() {
        let entry: ControlEntry = serde_json::from_str(
            r#"{"name": "a", "repository_path": "/srv/a.git", "target_path": "/work/a"}"#,
        )
        .expect("parse");
        assert!(!entry.force_overwrite());
        assert_eq!(entry.target_path(), Path::new("/work/a"));
    }

    #[test]
    fn false_force_overwrite_is_not_serialized() {
        let entry = ControlEntry::new("a", "/srv/a.git", "/work/a");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("force_overwrite"), "got: {json}");

        let forced = entry.with_force_overwrite(true);
        let json = serde_json::to_string(&forced).unwrap();
        assert!(json.contains(r#""force_overwrite":true"#), "got: {json}");
    }

    #[test]
    fn entry_display_shows_direction() {
        let entry = ControlEntry::new("a", "https://example.com/a.git", "/work/a");
        assert_eq!(entry.to_string(), "a (https://example.com/a.git -> /work/a)");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config: ControlsConfig = serde_json::from_str(
            r#"{"controls": [{"name": "a", "repository_path": "r", "target_path": "t", "comment": "x"}], "version": 2}"#,
        )
        .expect("parse");
        assert_eq!(config.controls.len(), 1);
    }
}
