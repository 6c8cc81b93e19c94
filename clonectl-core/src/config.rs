//! Control config files.
//!
//! # Format
//!
//! ```json
//! {
//!   "controls": [
//!     {"name": "docs", "repository_path": "/srv/git/docs.git", "target_path": "/work/docs"},
//!     {"name": "api", "repository_path": "https://example.com/api.git", "target_path": "/work/api", "force_overwrite": true}
//!   ]
//! }
//! ```
//!
//! Files ending in `.yaml` / `.yml` use the same schema in YAML.
//!
//! # API pattern
//!
//! Path defaults come in two forms, as `fn_at(home: &Path)` for tests and
//! `fn()` which resolves the home directory via `dirs::home_dir()`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{io_err, ControlError};
use crate::types::{ControlEntry, ControlsConfig};

pub const CONFIG_DIR: &str = ".clonectl";
pub const CONFIG_FILE: &str = "controls.json";

// ---------------------------------------------------------------------------
// 1. Paths
// ---------------------------------------------------------------------------

/// `<home>/.clonectl/controls.json` — pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `default_config_path_at` convenience wrapper.
pub fn default_config_path() -> Result<PathBuf, ControlError> {
    let home = dirs::home_dir().ok_or(ControlError::HomeNotFound)?;
    Ok(default_config_path_at(&home))
}

/// On-disk encoding, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Parse + validate
// ---------------------------------------------------------------------------

impl ControlsConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ControlError> {
        let config: ControlsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert an in-memory JSON value and validate it.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ControlError> {
        let config: ControlsConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Per-entry field checks plus name uniqueness within the batch.
    pub fn validate(&self) -> Result<(), ControlError> {
        let mut seen = HashSet::new();
        for (index, entry) in self.controls.iter().enumerate() {
            if let Err(reason) = entry.check_fields() {
                return Err(ControlError::InvalidEntry {
                    entry: format!("controls[{index}]"),
                    reason: reason.to_string(),
                });
            }
            if !seen.insert(entry.name()) {
                return Err(ControlError::DuplicateName {
                    name: entry.name().0.clone(),
                });
            }
        }
        Ok(())
    }
}

impl ControlEntry {
    pub(crate) fn check_fields(&self) -> Result<(), &'static str> {
        if self.name.0.trim().is_empty() {
            return Err("name is empty");
        }
        if self.repository_path.trim().is_empty() {
            return Err("repository_path is empty");
        }
        if self.target_path.as_os_str().is_empty() {
            return Err("target_path is empty");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 3. Read
// ---------------------------------------------------------------------------

/// Read and validate a config file.
///
/// Returns `ControlError::ConfigNotFound` if absent and
/// `ControlError::Parse` / `ParseYaml` (with path) if malformed.
pub fn read_config(path: &Path) -> Result<ControlsConfig, ControlError> {
    if !path.exists() {
        return Err(ControlError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config: ControlsConfig = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => {
            serde_json::from_str(&contents).map_err(|source| ControlError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(&contents).map_err(|source| ControlError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?
        }
    };
    config.validate()?;
    debug!(path = %path.display(), controls = config.controls.len(), "read config");
    Ok(config)
}

// ---------------------------------------------------------------------------
// 4. Write (atomic)
// ---------------------------------------------------------------------------

/// Atomically write `config` to `path` in the given format.
///
/// Write flow: serialize → `<file>.tmp` sibling → `rename`. The parent
/// directory is created if missing.
pub fn write_config_as(
    path: &Path,
    config: &ControlsConfig,
    format: ConfigFormat,
) -> Result<(), ControlError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }

    let body = match format {
        ConfigFormat::Json => {
            let mut s = serde_json::to_string_pretty(config)?;
            s.push('\n');
            s
        }
        ConfigFormat::Yaml => {
            serde_yaml::to_string(config).map_err(|source| ControlError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?
        }
    };

    let tmp = tmp_path(path);
    std::fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    debug!(path = %path.display(), controls = config.controls.len(), "wrote config");
    Ok(())
}

/// `write_config_as` with the format taken from the file extension.
pub fn write_config(path: &Path, config: &ControlsConfig) -> Result<(), ControlError> {
    write_config_as(path, config, ConfigFormat::from_path(path))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
