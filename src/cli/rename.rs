//! `dm rename` command implementation.

use crate::error::{Error, Result};
use crate::tools::renamer::{self, RenameOptions, RenamePlan};
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Arguments for `dm rename`.
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Text to find in file names (a regex with `--regex`).
    pub find: String,

    /// Replacement text (`$1` expands captures with `--regex`).
    pub replace: String,

    /// Directory holding the files. Defaults to the current directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Treat FIND as a regular expression.
    #[arg(long)]
    pub regex: bool,

    /// Match case-insensitively.
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Include subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Only these extensions (comma-separated, without dot).
    #[arg(short, long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Include dot-files.
    #[arg(long)]
    pub hidden: bool,

    /// Perform the renames. Without this only the plan is shown.
    #[arg(long)]
    pub apply: bool,
}

/// Run the rename command.
///
/// # Errors
///
/// Returns an error if the pattern is invalid, the plan has conflicts, or
/// a rename fails.
pub fn run(args: RenameArgs) -> Result<()> {
    let opts = RenameOptions {
        dir: super::find::root_or_cwd(args.dir)?,
        find: args.find,
        replace: args.replace,
        regex: args.regex,
        ignore_case: args.ignore_case,
        recursive: args.recursive,
        extensions: args.extensions,
        include_hidden: args.hidden,
    };

    let plan = renamer::plan(&opts)?;
    let mut out = io::stdout().lock();
    write_plan(&mut out, &opts.dir, &plan)?;

    if plan.is_empty() {
        return Ok(());
    }
    let conflicts = plan.conflicts();
    if conflicts > 0 {
        return Err(Error::RenameConflict(conflicts));
    }

    if args.apply {
        let renamed = renamer::apply(&plan)?;
        writeln!(out, "Renamed {renamed} file(s).")?;
    } else {
        writeln!(
            out,
            "Dry run: {} rename(s) planned. Re-run with --apply to rename.",
            plan.entries.len()
        )?;
    }
    Ok(())
}

fn write_plan<W: Write>(out: &mut W, dir: &Path, plan: &RenamePlan) -> io::Result<()> {
    if plan.is_empty() {
        return writeln!(out, "Nothing to rename.");
    }

    for entry in &plan.entries {
        let from = entry.from.strip_prefix(dir).unwrap_or(&entry.from);
        let to = entry
            .to
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        match &entry.conflict {
            Some(conflict) => writeln!(out, "  ! {} -> {to}  ({conflict})", from.display())?,
            None => writeln!(out, "    {} -> {to}", from.display())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::renamer::{Conflict, RenameEntry};

    #[test]
    fn plan_marks_conflicts() {
        let plan = RenamePlan {
            entries: vec![
                RenameEntry {
                    from: PathBuf::from("/d/a.txt"),
                    to: PathBuf::from("/d/b.txt"),
                    conflict: None,
                },
                RenameEntry {
                    from: PathBuf::from("/d/c.txt"),
                    to: PathBuf::from("/d/b.txt"),
                    conflict: Some(Conflict::Duplicate),
                },
            ],
        };
        let mut out = Vec::new();
        write_plan(&mut out, Path::new("/d"), &plan).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("    a.txt -> b.txt\n"));
        assert!(text.contains("  ! c.txt -> b.txt  (duplicate target)\n"));
    }

    #[test]
    fn empty_plan() {
        let mut out = Vec::new();
        write_plan(&mut out, Path::new("/d"), &RenamePlan::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Nothing to rename.\n");
    }
}
