//! `dm find` command implementation.

use super::Context;
use crate::error::Result;
use crate::tools::filesearch::{self, FileHit, SearchOptions, SortKey};
use crate::tools::{format_bytes, parse_duration, parse_size};
use chrono::{DateTime, Local};
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Arguments for `dm find`.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Name glob (`*.rs`) or substring. Case-insensitive.
    pub pattern: Option<String>,

    /// Directory to search. Defaults to the current directory.
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Only these extensions (comma-separated, without dot).
    #[arg(short, long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Minimum size (e.g. "10k", "5M").
    #[arg(long)]
    pub min_size: Option<String>,

    /// Maximum size.
    #[arg(long)]
    pub max_size: Option<String>,

    /// Only files modified within this duration (e.g. "7d", "24h").
    #[arg(short, long)]
    pub within: Option<String>,

    /// Maximum depth below the root.
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Include dot-files and dot-directories.
    #[arg(long)]
    pub hidden: bool,

    /// Sort by name, size or modified.
    #[arg(short, long, default_value = "name")]
    pub sort: SortKey,

    /// Maximum number of results. Defaults to `search.max_results`; 0 for all.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Run the find command.
///
/// # Errors
///
/// Returns an error if a filter value is invalid or the root is missing.
pub fn run(ctx: &Context, args: FindArgs) -> Result<()> {
    let search = &ctx.config().search;
    let opts = SearchOptions {
        root: root_or_cwd(args.root)?,
        pattern: args.pattern,
        extensions: args.extensions,
        min_size: args.min_size.as_deref().map(parse_size).transpose()?,
        max_size: args.max_size.as_deref().map(parse_size).transpose()?,
        modified_within: args.within.as_deref().map(parse_duration).transpose()?,
        max_depth: args.depth,
        include_hidden: args.hidden,
        exclude_dirs: search.exclude_dirs.clone(),
        sort: args.sort,
        limit: args.limit.unwrap_or(search.max_results),
    };

    let hits = filesearch::search(&opts)?;
    write_hits(&mut io::stdout().lock(), &opts.root, &hits)?;
    Ok(())
}

/// The given root, or the current directory.
pub(crate) fn root_or_cwd(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

/// Print hits as `modified  size  path`, paths relative to `root`.
pub(crate) fn write_hits<W: Write>(out: &mut W, root: &Path, hits: &[FileHit]) -> io::Result<()> {
    if hits.is_empty() {
        writeln!(out, "No files found.")?;
        return Ok(());
    }

    for hit in hits {
        let local: DateTime<Local> = hit.modified.into();
        let shown = hit.path.strip_prefix(root).unwrap_or(&hit.path);
        writeln!(
            out,
            "{}  {:>10}  {}",
            local.format("%Y-%m-%d %H:%M"),
            format_bytes(hit.size),
            shown.display()
        )?;
    }
    writeln!(out, "{} file(s)", hits.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn hits_are_relative_to_root() {
        let hits = vec![FileHit {
            path: PathBuf::from("/work/src/main.rs"),
            size: 2048,
            modified: Utc::now(),
        }];
        let mut out = Vec::new();
        write_hits(&mut out, Path::new("/work"), &hits).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2.0 KiB"));
        assert!(text.contains(&format!("  {}", Path::new("src/main.rs").display())));
        assert!(text.ends_with("1 file(s)\n"));
    }

    #[test]
    fn no_hits_message() {
        let mut out = Vec::new();
        write_hits(&mut out, Path::new("/"), &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No files found.\n");
    }
}
