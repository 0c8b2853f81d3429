//! `dm recent` command implementation.

use super::Context;
use super::find::{root_or_cwd, write_hits};
use crate::error::Result;
use crate::tools::{parse_duration, recent};
use std::io;
use std::path::PathBuf;

/// Default number of files to show.
const DEFAULT_LIMIT: usize = 20;

/// Run the recent command.
///
/// # Errors
///
/// Returns an error if the duration is invalid or the root is missing.
pub fn run(ctx: &Context, within: &str, limit: Option<usize>, root: Option<PathBuf>) -> Result<()> {
    let root = root_or_cwd(root)?;
    let within = parse_duration(within)?;
    let hits = recent::recent(
        &root,
        within,
        limit.unwrap_or(DEFAULT_LIMIT),
        &ctx.config().search.exclude_dirs,
    )?;
    write_hits(&mut io::stdout().lock(), &root, &hits)?;
    Ok(())
}
