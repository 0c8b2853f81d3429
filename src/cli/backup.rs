//! `dm backup` command implementation.

use super::Context;
use crate::error::Result;
use crate::tools::{backup, format_bytes};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Run the backup command.
///
/// The destination defaults to `backup.dest`, then `$DM_HOME/backups`.
/// `exclude` globs are added to the configured `backup.exclude`.
///
/// # Errors
///
/// Returns an error if the source is missing or the archive cannot be
/// written.
pub fn run(ctx: &Context, source: &Path, dest: Option<PathBuf>, exclude: &[String]) -> Result<()> {
    let config = ctx.config();
    let dest = dest.unwrap_or_else(|| config.backup_dest(ctx.home()));
    let mut patterns = config.backup.exclude.clone();
    patterns.extend_from_slice(exclude);

    let report = backup::create(source, &dest, &patterns, Local::now())?;
    println!("{}", report.archive.display());
    println!(
        "{} file(s), {} stored",
        report.files,
        format_bytes(report.bytes)
    );
    Ok(())
}
