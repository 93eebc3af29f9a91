//! Cache snapshot persistence and change detection.
//!
//! A sync pass produces one complete `CacheSnapshot` (entries + bindings),
//! persisted as pretty JSON next to the config. Change detection diffs the
//! currently resolvable source set against the previous snapshot without
//! re-parsing: modification time is a cheap pre-filter, and only a content
//! fingerprint mismatch counts as changed, so a touch without an edit does
//! not trigger work.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::{cache_path, config_dir, Config};
use crate::error::{KeybeeError, Result};
use crate::parsers::Binding;
use crate::resolver::resolve_source_path;

pub const CACHE_VERSION: u32 = 1;

/// One successfully parsed source from the last completed sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub path: String,
    /// SHA-256 of the file content, hex encoded.
    pub hash: String,
    /// Modification time in unix milliseconds.
    pub mtime: u64,
    pub bindings_count: usize,
}

/// The full persisted state. Replacing the whole snapshot is the only
/// mutation; there is no partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub version: u32,
    pub last_sync: DateTime<Utc>,
    pub entries: Vec<CacheEntry>,
    pub bindings: Vec<Binding>,
}

impl CacheSnapshot {
    pub fn new(entries: Vec<CacheEntry>, bindings: Vec<Binding>) -> Self {
        CacheSnapshot {
            version: CACHE_VERSION,
            last_sync: Utc::now(),
            entries,
            bindings,
        }
    }
}

/// Paths whose membership or content changed since the cached snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub changed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }
}

/// SHA-256 content fingerprint, hex encoded.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let content = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&content)))
}

/// Modification time as unix milliseconds. Files with a pre-epoch mtime
/// report 0.
pub fn mtime_millis(path: &Path) -> std::io::Result<u64> {
    let modified = fs::metadata(path)?.modified()?;
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Ok(millis)
}

/// Load the persisted snapshot, or `None` if it is missing or unreadable.
pub fn load_cache() -> Option<CacheSnapshot> {
    load_cache_from(&cache_path())
}

pub fn load_cache_from(path: &Path) -> Option<CacheSnapshot> {
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to read cache");
            return None;
        }
    };
    match serde_json::from_str::<CacheSnapshot>(&content) {
        Ok(cache) => {
            debug!(
                entries = cache.entries.len(),
                bindings = cache.bindings.len(),
                "Loaded cache snapshot"
            );
            Some(cache)
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to parse cache, ignoring");
            None
        }
    }
}

/// Persist the replacement snapshot as pretty JSON.
pub fn save_cache(cache: &CacheSnapshot) -> Result<()> {
    let dir = config_dir();
    fs::create_dir_all(&dir).map_err(|e| KeybeeError::CacheSave {
        path: dir.display().to_string(),
        source: e,
    })?;
    save_cache_to(cache, &cache_path())
}

pub fn save_cache_to(cache: &CacheSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(cache)
        .map_err(|e| KeybeeError::Config(format!("failed to serialize cache: {e}")))?;
    fs::write(path, json).map_err(|e| KeybeeError::CacheSave {
        path: path.display().to_string(),
        source: e,
    })?;
    info!(
        path = %path.display(),
        entries = cache.entries.len(),
        bindings = cache.bindings.len(),
        "Saved cache snapshot"
    );
    Ok(())
}

/// Diff the currently resolvable source set against the previous snapshot.
///
/// With no cache at all, every resolvable source is `added`. A per-file
/// stat or hash failure (e.g. the file vanished mid-check) drops that file
/// from the diff rather than aborting it.
pub fn detect_changes(config: &Config, cache: Option<&CacheSnapshot>) -> ChangeSet {
    let mut result = ChangeSet::default();

    let current: Vec<PathBuf> = config
        .enabled_sources()
        .filter_map(|source| resolve_source_path(source, &config.base_paths))
        .collect();

    let Some(cache) = cache else {
        result.added = current;
        return result;
    };

    let entries: HashMap<&str, &CacheEntry> =
        cache.entries.iter().map(|e| (e.path.as_str(), e)).collect();
    let current_set: HashSet<&Path> = current.iter().map(PathBuf::as_path).collect();

    for path in &current {
        let key = path.display().to_string();
        let Some(entry) = entries.get(key.as_str()) else {
            result.added.push(path.clone());
            continue;
        };

        // mtime not newer than the cached one: assume unchanged, skip the
        // hash. A newer mtime alone is not enough; the content fingerprint
        // must also differ.
        match mtime_millis(path) {
            Ok(mtime) if mtime > entry.mtime => match hash_file(path) {
                Ok(hash) if hash != entry.hash => result.changed.push(path.clone()),
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, path = %path.display(), "Fingerprint failed, skipping")
                }
            },
            Ok(_) => {}
            Err(e) => debug!(error = %e, path = %path.display(), "Stat failed, skipping"),
        }
    }

    for entry in &cache.entries {
        if !current_set.contains(Path::new(&entry.path)) {
            result.removed.push(PathBuf::from(&entry.path));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuiltinKind;
    use std::fs;

    fn config_for(paths: &[&Path]) -> Config {
        Config {
            sources: paths
                .iter()
                .map(|p| BuiltinKind::Skhd.source(p.display().to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn entry_for(path: &Path) -> CacheEntry {
        CacheEntry {
            path: path.display().to_string(),
            hash: hash_file(path).unwrap(),
            mtime: mtime_millis(path).unwrap(),
            bindings_count: 1,
        }
    }

    #[test]
    fn no_cache_reports_all_resolved_sources_as_added() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("skhdrc");
        fs::write(&file, "cmd - a : open -a Terminal\n").unwrap();

        let diff = detect_changes(&config_for(&[&file]), None);
        assert_eq!(diff.added, vec![file]);
        assert!(diff.changed.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn unchanged_file_reports_empty_diff() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("skhdrc");
        fs::write(&file, "cmd - a : open -a Terminal\n").unwrap();

        let snapshot = CacheSnapshot::new(vec![entry_for(&file)], Vec::new());
        let diff = detect_changes(&config_for(&[&file]), Some(&snapshot));
        assert!(diff.is_empty());
    }

    #[test]
    fn touched_but_identical_file_is_not_changed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("skhdrc");
        let content = "cmd - a : open -a Terminal\n";
        fs::write(&file, content).unwrap();

        // Cached mtime predates the write, so the hash comparison runs;
        // identical content must still come out unchanged.
        let mut entry = entry_for(&file);
        entry.mtime = entry.mtime.saturating_sub(10_000);
        let snapshot = CacheSnapshot::new(vec![entry], Vec::new());

        let diff = detect_changes(&config_for(&[&file]), Some(&snapshot));
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn edited_file_is_changed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("skhdrc");
        fs::write(&file, "cmd - a : open -a Terminal\n").unwrap();

        let mut entry = entry_for(&file);
        entry.mtime = entry.mtime.saturating_sub(10_000);
        entry.hash = "0".repeat(64);
        let snapshot = CacheSnapshot::new(vec![entry], Vec::new());

        let diff = detect_changes(&config_for(&[&file]), Some(&snapshot));
        assert_eq!(diff.changed, vec![file]);
        assert!(diff.added.is_empty());
    }

    #[test]
    fn vanished_cached_path_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("deleted-rc");

        let snapshot = CacheSnapshot::new(
            vec![CacheEntry {
                path: gone.display().to_string(),
                hash: "0".repeat(64),
                mtime: 0,
                bindings_count: 3,
            }],
            Vec::new(),
        );

        let diff = detect_changes(&config_for(&[]), Some(&snapshot));
        assert_eq!(diff.removed, vec![gone]);
    }

    #[test]
    fn unresolvable_source_is_simply_absent() {
        let config = config_for(&[Path::new("/nonexistent/keybee/skhdrc")]);
        let diff = detect_changes(&config, None);
        assert!(diff.is_empty());
    }

    #[test]
    fn snapshot_round_trips_camel_case_json() {
        let snapshot = CacheSnapshot::new(
            vec![CacheEntry {
                path: "/tmp/skhdrc".to_string(),
                hash: "abc123".to_string(),
                mtime: 1_700_000_000_000,
                bindings_count: 2,
            }],
            Vec::new(),
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""lastSync""#));
        assert!(json.contains(r#""bindingsCount":2"#));

        let back: CacheSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, CACHE_VERSION);
        assert_eq!(back.entries, snapshot.entries);
    }

    #[test]
    fn save_and_load_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let snapshot = CacheSnapshot::new(Vec::new(), Vec::new());

        save_cache_to(&snapshot, &path).unwrap();
        let loaded = load_cache_from(&path).unwrap();
        assert_eq!(loaded.version, CACHE_VERSION);
        assert!(loaded.entries.is_empty());
    }

    #[test]
    fn invalid_cache_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_cache_from(&path).is_none());
    }
}
