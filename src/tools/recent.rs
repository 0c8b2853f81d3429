//! Recently modified files.

use super::filesearch::{self, FileHit, SearchOptions, SortKey};
use crate::error::Result;
use chrono::Duration;
use std::path::Path;

/// Files under `root` modified within `within`, newest first.
///
/// # Errors
///
/// Returns an error if the root is missing.
pub fn recent(
    root: &Path,
    within: Duration,
    limit: usize,
    exclude_dirs: &[String],
) -> Result<Vec<FileHit>> {
    filesearch::search(&SearchOptions {
        root: root.to_path_buf(),
        modified_within: Some(within),
        exclude_dirs: exclude_dirs.to_vec(),
        sort: SortKey::Modified,
        limit,
        ..SearchOptions::default()
    })
}
