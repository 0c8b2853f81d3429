//! Merged-config cache keyed by source modification times.

use super::loader::expand_includes;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CACHE_PREFIX: &str = "config-cache-";

/// A cached merge result plus everything needed to validate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Profile requested when the entry was built.
    pub profile: Option<String>,

    /// Directory include globs are relative to.
    pub base_dir: PathBuf,

    /// Include globs from the base file.
    pub patterns: Vec<String>,

    /// Files the globs expanded to.
    pub includes: Vec<PathBuf>,

    /// Every file read (or looked for) while merging.
    pub sources: Vec<SourceStamp>,

    /// The merged document.
    pub merged: Value,
}

impl CacheEntry {
    /// Check whether this entry still describes the files on disk.
    ///
    /// Stale when the profile differs, any source's modification time
    /// changed (including appearing or disappearing), or the include globs
    /// now match a different set of files.
    #[must_use]
    pub fn is_fresh(&self, profile: Option<&str>) -> bool {
        if self.profile.as_deref() != profile {
            return false;
        }

        if let Some(stale) = self.sources.iter().find(|s| !s.is_current()) {
            debug!(path = %stale.path.display(), "config source changed");
            return false;
        }

        match expand_includes(&self.base_dir, &self.patterns) {
            Ok(includes) => includes == self.includes,
            Err(_) => false,
        }
    }
}

/// Modification time of a source file; `None` when it did not exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceStamp {
    /// Source path.
    pub path: PathBuf,

    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
}

impl SourceStamp {
    /// Stamp a path as it is now.
    #[must_use]
    pub fn capture(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            modified: modified_time(path),
        }
    }

    /// Whether the file on disk still matches the stamp.
    #[must_use]
    pub fn is_current(&self) -> bool {
        modified_time(&self.path) == self.modified
    }
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Cache file for a given config path.
///
/// The name carries a hash of the config path so that different
/// `DM_CONFIG` values never share an entry.
#[must_use]
pub fn cache_path(home: &Path, config_path: &Path) -> PathBuf {
    let digest = Sha256::digest(config_path.to_string_lossy().as_bytes());
    let short = &hex::encode(digest)[..16];
    home.join(format!("{CACHE_PREFIX}{short}.json"))
}

/// Read a cache entry. Missing or unreadable caches read as `None`.
#[must_use]
pub fn read(path: &Path) -> Option<CacheEntry> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(entry) => Some(entry),
        Err(e) => {
            debug!(error = %e, path = %path.display(), "ignoring corrupt config cache");
            None
        }
    }
}

/// Write a cache entry atomically.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write(path: &Path, entry: &CacheEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = path.with_extension("tmp");

    let contents = serde_json::to_string_pretty(entry)?;
    fs::write(&temp, &contents)?;

    fs::rename(&temp, path)?;

    Ok(())
}

/// Delete every config cache under `home`. Returns how many were removed.
///
/// # Errors
///
/// Returns an error if a cache file cannot be removed.
pub fn clear(home: &Path) -> Result<usize> {
    if !home.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(home)? {
        let path = entry?.path();
        let is_cache = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(CACHE_PREFIX));
        if is_cache && path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
