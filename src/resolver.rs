//! Source path resolution.
//!
//! A declared source path is absolute, home-relative, or relative to the
//! configured base search roots. Resolution tries the declaration directly
//! first, then each base root in order, and returns the first path that
//! exists on disk. Absence is not an error; an unresolved source is simply
//! excluded from the sync pass. No glob expansion happens here (discovery
//! globbing is a separate setup-time operation).

use std::path::{Path, PathBuf};

use crate::config::SourceConfig;

/// Expand a leading `~` to the user's home directory.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Resolve a declared source to a concrete on-disk file, or `None` when it
/// cannot be found.
pub fn resolve_source_path(source: &SourceConfig, base_paths: &[String]) -> Option<PathBuf> {
    let declared = source.path();

    if Path::new(declared).is_absolute() || declared.starts_with("~/") || declared == "~" {
        let expanded = expand_path(declared);
        return expanded.exists().then_some(expanded);
    }

    for base in base_paths {
        let candidate = expand_path(base).join(declared);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}
