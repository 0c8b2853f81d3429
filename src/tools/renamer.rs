//! Batch rename planning and application.
//!
//! A plan is computed first and checked for conflicts; it is only applied
//! when it has none. Application goes through temporary names so swaps
//! (`a -> b`, `b -> a`) and chains (`a -> b`, `b -> c`) are safe.

use crate::error::{Error, Result};
use super::filesearch::is_hidden;
use regex::{NoExpand, Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What to rename and how.
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    /// Directory holding the files.
    pub dir: PathBuf,

    /// Text or regex to find in file names.
    pub find: String,

    /// Replacement; `$1`/`${name}` expand in regex mode.
    pub replace: String,

    /// Treat `find` as a regex.
    pub regex: bool,

    /// Case-insensitive matching.
    pub ignore_case: bool,

    /// Descend into subdirectories.
    pub recursive: bool,

    /// Only files with these extensions (without dot). Empty allows all.
    pub extensions: Vec<String>,

    /// Include dot-files.
    pub include_hidden: bool,
}

/// Why a plan entry cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The new name is empty, `.` or `..`.
    EmptyName,
    /// The new name contains a path separator.
    InvalidName,
    /// The new name is longer than a file name may be.
    TooLong,
    /// Another entry renames to the same target.
    Duplicate,
    /// The target exists and is not being renamed away.
    Exists,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyName => "empty name",
            Self::InvalidName => "name contains a path separator",
            Self::TooLong => "name too long",
            Self::Duplicate => "duplicate target",
            Self::Exists => "target already exists",
        };
        f.write_str(text)
    }
}

/// One rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    /// Current path.
    pub from: PathBuf,

    /// New path (same directory).
    pub to: PathBuf,

    /// Problem preventing the rename, if any.
    pub conflict: Option<Conflict>,
}

/// A checked set of renames.
#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    /// Entries in walk order.
    pub entries: Vec<RenameEntry>,
}

impl RenamePlan {
    /// Number of entries with conflicts.
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.entries.iter().filter(|e| e.conflict.is_some()).count()
    }

    /// Whether nothing would be renamed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Longest file name, in bytes, most filesystems accept.
const MAX_NAME_BYTES: usize = 255;

/// Build the matcher. Literal mode escapes `find` so only regex flags apply.
fn build_regex(opts: &RenameOptions) -> Result<Regex> {
    let source = if opts.regex {
        opts.find.clone()
    } else {
        regex::escape(&opts.find)
    };
    if source.is_empty() {
        return Err(Error::InvalidPattern("empty search text".to_string()));
    }
    Ok(RegexBuilder::new(&source)
        .case_insensitive(opts.ignore_case)
        .build()?)
}

/// Compute a rename plan.
///
/// # Errors
///
/// Returns an error if the directory is missing, the pattern is invalid,
/// or the walk fails.
pub fn plan(opts: &RenameOptions) -> Result<RenamePlan> {
    if !opts.dir.is_dir() {
        return Err(Error::PathNotFound(opts.dir.clone()));
    }
    let re = build_regex(opts)?;
    let extensions: Vec<String> = opts
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    let max_depth = if opts.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(&opts.dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || opts.include_hidden || !is_hidden(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext_ok = extensions.is_empty()
            || entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|w| w.eq_ignore_ascii_case(e)));
        if ext_ok {
            files.push(entry.into_path());
        }
    }

    let mut entries = Vec::new();
    for from in files {
        let Some(name) = from.file_name().and_then(|n| n.to_str()) else {
            debug!(path = %from.display(), "skipping non-UTF-8 name");
            continue;
        };
        let new_name = if opts.regex {
            re.replace_all(name, opts.replace.as_str())
        } else {
            re.replace_all(name, NoExpand(&opts.replace))
        };
        if new_name == name {
            continue;
        }

        let conflict = if new_name.is_empty() || new_name == "." || new_name == ".." {
            Some(Conflict::EmptyName)
        } else if new_name.contains(['/', '\\']) {
            Some(Conflict::InvalidName)
        } else if new_name.len() > MAX_NAME_BYTES {
            Some(Conflict::TooLong)
        } else {
            None
        };
        let to = from.with_file_name(&*new_name);
        entries.push(RenameEntry { from, to, conflict });
    }

    mark_duplicates(&mut entries);
    mark_collisions(&mut entries);

    Ok(RenamePlan { entries })
}

/// Targets are compared case-insensitively.
fn mark_duplicates(entries: &mut [RenameEntry]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries.iter() {
        *counts.entry(fold(&entry.to)).or_default() += 1;
    }
    for entry in entries.iter_mut() {
        if entry.conflict.is_none() && counts[&fold(&entry.to)] > 1 {
            entry.conflict = Some(Conflict::Duplicate);
        }
    }
}

fn mark_collisions(entries: &mut [RenameEntry]) {
    let sources: Vec<PathBuf> = entries.iter().map(|e| e.from.clone()).collect();
    for entry in entries.iter_mut() {
        if entry.conflict.is_some() || !entry.to.exists() {
            continue;
        }
        let moving_away = sources.iter().any(|s| s == &entry.to);
        if !moving_away && !same_file(&entry.from, &entry.to) {
            entry.conflict = Some(Conflict::Exists);
        }
    }
}

fn fold(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Whether two paths name the same file (e.g. a case-only rename on a
/// case-insensitive filesystem).
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    fold(a) == fold(b)
}

/// Apply a conflict-free plan. Returns the number of files renamed.
///
/// If any rename fails, the renames already done are undone before the
/// error is returned.
///
/// # Errors
///
/// Returns `RenameConflict` without touching anything if the plan has
/// conflicts, or an I/O error if a rename fails.
pub fn apply(plan: &RenamePlan) -> Result<usize> {
    let conflicts = plan.conflicts();
    if conflicts > 0 {
        return Err(Error::RenameConflict(conflicts));
    }

    let pid = std::process::id();
    let mut staged: Vec<(PathBuf, &RenameEntry)> = Vec::with_capacity(plan.entries.len());
    for (idx, entry) in plan.entries.iter().enumerate() {
        let temp = entry
            .from
            .with_file_name(format!(".dm-rename-{pid}-{idx}.tmp"));
        if let Err(e) = fs::rename(&entry.from, &temp) {
            roll_back(&staged, 0);
            return Err(e.into());
        }
        staged.push((temp, entry));
    }

    for (placed, (temp, entry)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(temp, &entry.to) {
            roll_back(&staged, placed);
            return Err(e.into());
        }
        debug!(to = %entry.to.display(), "renamed");
    }

    info!(count = staged.len(), "rename plan applied");
    Ok(staged.len())
}

/// Undo a partial apply: the first `placed` entries are at their targets,
/// the rest of `staged` sit under temp names.
fn roll_back(staged: &[(PathBuf, &RenameEntry)], placed: usize) {
    for (temp, entry) in staged[..placed].iter().rev() {
        if let Err(e) = fs::rename(&entry.to, temp) {
            warn!(error = %e, path = %entry.to.display(), "rollback failed");
        }
    }
    for (temp, entry) in staged.iter().rev() {
        if let Err(e) = fs::rename(temp, &entry.from) {
            warn!(error = %e, path = %temp.display(), "rollback failed, file left at temp name");
        }
    }
}
