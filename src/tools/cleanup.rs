//! Empty-folder cleanup.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Find (and unless `dry_run`, remove) empty directories below `root`.
///
/// Directories are visited bottom-up, so a directory whose only contents
/// are empty directories counts as empty too. The root itself is never
/// removed. Directories named in `exclude` are neither entered nor
/// removed, which also keeps their parents.
///
/// Returns the removed (or removable) directories, deepest first.
///
/// # Errors
///
/// Returns an error if the root is missing or a directory cannot be read
/// or removed.
pub fn remove_empty_dirs(root: &Path, exclude: &[String], dry_run: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }

    let mut removed: Vec<PathBuf> = Vec::new();
    let mut empty: HashSet<PathBuf> = HashSet::new();

    let walk = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && e.file_name()
                        .to_str()
                        .is_some_and(|n| exclude.iter().any(|x| x == n)))
        });

    for entry in walk {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();

        let mut is_empty = true;
        for child in fs::read_dir(dir)? {
            if !empty.contains(&child?.path()) {
                is_empty = false;
                break;
            }
        }
        if !is_empty {
            continue;
        }

        if !dry_run {
            fs::remove_dir(dir)?;
        }
        debug!(dir = %dir.display(), dry_run, "empty directory");
        empty.insert(dir.to_path_buf());
        removed.push(dir.to_path_buf());
    }

    Ok(removed)
}
