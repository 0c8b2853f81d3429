//! File search: a filtered directory walk.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Path, ascending.
    #[default]
    Name,
    /// Size, largest first.
    Size,
    /// Modification time, newest first.
    Modified,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            "modified" | "mtime" | "time" => Ok(Self::Modified),
            other => Err(Error::InvalidArgument(format!(
                "unknown sort key: {other} (expected name, size or modified)"
            ))),
        }
    }
}

/// Search filters.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Walk root.
    pub root: PathBuf,

    /// File name filter: a glob when it contains `*?[`, else a substring.
    /// Case-insensitive either way.
    pub pattern: Option<String>,

    /// Allowed extensions (without dot, case-insensitive). Empty allows all.
    pub extensions: Vec<String>,

    /// Minimum size in bytes.
    pub min_size: Option<u64>,

    /// Maximum size in bytes.
    pub max_size: Option<u64>,

    /// Only files modified within this window.
    pub modified_within: Option<Duration>,

    /// Maximum depth below the root.
    pub max_depth: Option<usize>,

    /// Include dot-files and dot-directories.
    pub include_hidden: bool,

    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,

    /// Result ordering.
    pub sort: SortKey,

    /// Result limit; 0 means unlimited.
    pub limit: usize,
}

/// A matching file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHit {
    /// File path.
    pub path: PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// Last modification time.
    pub modified: DateTime<Utc>,
}

enum NameMatcher {
    Glob(Pattern),
    Substring(String),
}

impl NameMatcher {
    fn new(pattern: &str) -> Result<Self> {
        if pattern.contains(['*', '?', '[']) {
            Ok(Self::Glob(Pattern::new(pattern)?))
        } else {
            Ok(Self::Substring(pattern.to_lowercase()))
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches_with(
                name,
                MatchOptions {
                    case_sensitive: false,
                    ..MatchOptions::new()
                },
            ),
            Self::Substring(needle) => name.to_lowercase().contains(needle),
        }
    }
}

/// Whether a walk entry is a dot-file or dot-directory.
#[must_use]
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.') && name.len() > 1)
}

/// Run a search.
///
/// Entries that cannot be read during the walk are skipped.
///
/// # Errors
///
/// Returns an error if the root is missing or the name pattern is invalid.
pub fn search(opts: &SearchOptions) -> Result<Vec<FileHit>> {
    if !opts.root.is_dir() {
        return Err(Error::PathNotFound(opts.root.clone()));
    }

    let matcher = opts.pattern.as_deref().map(NameMatcher::new).transpose()?;
    let extensions: Vec<String> = opts
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();
    let cutoff = opts.modified_within.map(|d| Utc::now() - d);

    let mut walker = WalkDir::new(&opts.root).follow_links(false);
    if let Some(depth) = opts.max_depth {
        walker = walker.max_depth(depth);
    }

    let walk = walker.into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        if !opts.include_hidden && is_hidden(entry) {
            return false;
        }
        !(entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| opts.exclude_dirs.iter().any(|d| d == name)))
    });

    let mut hits = Vec::new();
    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if matcher.as_ref().is_some_and(|m| !m.matches(&name)) {
            continue;
        }
        if !extensions.is_empty() && !has_extension(entry.path(), &extensions) {
            continue;
        }

        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let size = meta.len();
        if opts.min_size.is_some_and(|min| size < min) || opts.max_size.is_some_and(|max| size > max)
        {
            continue;
        }
        let Ok(modified) = meta.modified().map(DateTime::<Utc>::from) else {
            continue;
        };
        if cutoff.is_some_and(|cutoff| modified < cutoff) {
            continue;
        }

        hits.push(FileHit {
            path: entry.into_path(),
            size,
            modified,
        });
    }

    sort_hits(&mut hits, opts.sort);
    if opts.limit > 0 {
        hits.truncate(opts.limit);
    }
    Ok(hits)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
}

fn sort_hits(hits: &mut [FileHit], key: SortKey) {
    match key {
        SortKey::Name => hits.sort_by(|a, b| a.path.cmp(&b.path)),
        SortKey::Size => hits.sort_by(|a, b| b.size.cmp(&a.size).then(a.path.cmp(&b.path))),
        SortKey::Modified => {
            hits.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.path.cmp(&b.path)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration as StdDuration, SystemTime};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, bytes: usize) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, vec![b'x'; bytes]).unwrap();
        path
    }

    fn age(path: &Path, days: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - StdDuration::from_secs(days * 86_400))
            .unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "readme.md", 10);
        write(dir.path(), "src/main.rs", 300);
        write(dir.path(), "src/lib.RS", 50);
        write(dir.path(), "src/deep/nested/util.rs", 20);
        write(dir.path(), "target/debug/build.rs", 5);
        write(dir.path(), ".git/config", 5);
        write(dir.path(), ".env", 5);
        dir
    }

    fn opts(root: &Path) -> SearchOptions {
        SearchOptions {
            root: root.to_path_buf(),
            exclude_dirs: vec![".git".to_string(), "target".to_string()],
            ..SearchOptions::default()
        }
    }

    fn names(hits: &[FileHit], root: &Path) -> Vec<String> {
        hits.iter()
            .map(|h| {
                h.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn skips_hidden_and_excluded() {
        let dir = fixture();
        let hits = search(&opts(dir.path())).unwrap();
        assert_eq!(
            names(&hits, dir.path()),
            vec![
                "readme.md",
                "src/deep/nested/util.rs",
                "src/lib.RS",
                "src/main.rs"
            ]
        );
    }

    #[test]
    fn hidden_flag_includes_dotfiles() {
        let dir = fixture();
        let mut o = opts(dir.path());
        o.include_hidden = true;
        let found = names(&search(&o).unwrap(), dir.path());
        assert!(found.contains(&".env".to_string()));
        // Excluded directories stay excluded
        assert!(!found.iter().any(|n| n.starts_with(".git")));
    }

    #[test]
    fn glob_pattern_is_case_insensitive() {
        let dir = fixture();
        let mut o = opts(dir.path());
        o.pattern = Some("*.rs".to_string());
        assert_eq!(search(&o).unwrap().len(), 3);
    }

    #[test]
    fn substring_pattern() {
        let dir = fixture();
        let mut o = opts(dir.path());
        o.pattern = Some("MAIN".to_string());
        assert_eq!(names(&search(&o).unwrap(), dir.path()), vec!["src/main.rs"]);
    }

    #[test]
    fn extension_and_size_filters() {
        let dir = fixture();
        let mut o = opts(dir.path());
        o.extensions = vec![".rs".to_string()];
        o.min_size = Some(30);
        o.max_size = Some(100);
        assert_eq!(names(&search(&o).unwrap(), dir.path()), vec!["src/lib.RS"]);
    }

    #[test]
    fn max_depth_limits_walk() {
        let dir = fixture();
        let mut o = opts(dir.path());
        o.max_depth = Some(1);
        assert_eq!(names(&search(&o).unwrap(), dir.path()), vec!["readme.md"]);
    }

    #[test]
    fn sort_by_size_with_limit() {
        let dir = fixture();
        let mut o = opts(dir.path());
        o.sort = SortKey::Size;
        o.limit = 2;
        assert_eq!(
            names(&search(&o).unwrap(), dir.path()),
            vec!["src/main.rs", "src/lib.RS"]
        );
    }

    #[test]
    fn modified_within_filters_old_files() {
        let dir = fixture();
        age(&dir.path().join("readme.md"), 30);
        let mut o = opts(dir.path());
        o.modified_within = Some(Duration::days(7));
        let found = names(&search(&o).unwrap(), dir.path());
        assert!(!found.contains(&"readme.md".to_string()));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn missing_root_is_an_error() {
        let o = opts(Path::new("/no/such/root"));
        assert!(matches!(search(&o), Err(Error::PathNotFound(_))));
    }

    #[test]
    fn sort_key_parses() {
        assert_eq!("size".parse::<SortKey>().unwrap(), SortKey::Size);
        assert_eq!("MTIME".parse::<SortKey>().unwrap(), SortKey::Modified);
        assert!("color".parse::<SortKey>().is_err());
    }
}
