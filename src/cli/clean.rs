//! `dm clean-empty` command implementation.

use super::Context;
use super::find::root_or_cwd;
use crate::error::Result;
use crate::tools::cleanup;
use std::path::PathBuf;

/// Run the clean-empty command.
///
/// Removes empty directories under the root. Without `apply`, only lists
/// what would be removed. Directory names in `exclude` are added to the
/// configured `search.exclude_dirs`.
///
/// # Errors
///
/// Returns an error if the root is missing or a directory cannot be removed.
pub fn run(ctx: &Context, root: Option<PathBuf>, exclude: &[String], apply: bool) -> Result<()> {
    let root = root_or_cwd(root)?;
    let mut excluded = ctx.config().search.exclude_dirs.clone();
    excluded.extend_from_slice(exclude);

    let removed = cleanup::remove_empty_dirs(&root, &excluded, !apply)?;

    if removed.is_empty() {
        println!("No empty directories.");
        return Ok(());
    }

    for dir in &removed {
        println!("  {}", dir.strip_prefix(&root).unwrap_or(dir).display());
    }
    if apply {
        println!("Removed {} empty director(ies).", removed.len());
    } else {
        println!(
            "Dry run: {} empty director(ies). Re-run with --apply to remove.",
            removed.len()
        );
    }

    Ok(())
}
