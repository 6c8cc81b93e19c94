//! Filesystem and source-string probes.

use std::path::Path;

/// URL schemes that `git` resolves itself.
const REMOTE_PREFIXES: &[&str] = &["http://", "https://", "git://", "ssh://", "file://", "git@"];

/// `true` when `path` holds a work tree (`.git`) or a bare repository (`HEAD`).
pub fn is_git_repository(path: &Path) -> bool {
    path.join(".git").exists() || path.join("HEAD").exists()
}

/// `true` when `source` names a directory on this machine rather than a URL.
pub fn is_local_path(source: &str) -> bool {
    let has_scheme = REMOTE_PREFIXES
        .iter()
        .any(|prefix| source.starts_with(prefix));
    !has_scheme && !is_scp_like(source)
}

/// `[user@]host:path`, which git reads as ssh when the colon comes before
/// any slash. A single drive letter (`C:\repo`, `C:/repo`) stays local.
fn is_scp_like(source: &str) -> bool {
    let Some(colon) = source.find(':') else {
        return false;
    };
    let host = &source[..colon];
    if host.is_empty() || host.contains('/') || host.contains('\\') {
        return false;
    }
    !(host.len() == 1 && host.as_bytes()[0].is_ascii_alphabetic())
}
