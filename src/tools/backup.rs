//! Zip backups of a directory.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use glob::{MatchOptions, Pattern};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Outcome of a backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Archive written.
    pub archive: PathBuf,

    /// Files stored.
    pub files: usize,

    /// Uncompressed bytes stored.
    pub bytes: u64,
}

/// Archive file name: `<dirname>-<YYYYmmdd-HHMMSS>.zip`.
#[must_use]
pub fn archive_name(source: &Path, at: DateTime<Local>) -> String {
    let stem = source
        .file_name()
        .map_or_else(|| "backup".to_string(), |n| n.to_string_lossy().into_owned());
    format!("{stem}-{}.zip", at.format("%Y%m%d-%H%M%S"))
}

/// First archive path in `dest_dir` that is not taken, adding `-1`, `-2`...
/// after the timestamp when needed.
fn free_archive_path(dest_dir: &Path, name: &str) -> PathBuf {
    let first = dest_dir.join(name);
    if !first.exists() {
        return first;
    }
    let stem = name.trim_end_matches(".zip");
    (1..)
        .map(|n| dest_dir.join(format!("{stem}-{n}.zip")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// An archive being written. Removed on drop unless renamed into place.
struct PartFile {
    path: PathBuf,
    done: bool,
}

impl PartFile {
    fn create(path: PathBuf) -> io::Result<(Self, File)> {
        let file = File::create(&path)?;
        Ok((Self { path, done: false }, file))
    }

    fn finish(mut self, archive: &Path) -> io::Result<()> {
        fs::rename(&self.path, archive)?;
        self.done = true;
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(error = %e, path = %self.path.display(), "could not remove partial archive");
        }
    }
}

/// Relative path with `/` separators, as stored in the archive.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn excluded(patterns: &[Pattern], name: &str) -> bool {
    let options = MatchOptions {
        require_literal_separator: false,
        ..MatchOptions::new()
    };
    let file_name = name.rsplit('/').next().unwrap_or(name);
    patterns
        .iter()
        .any(|p| p.matches_with(name, options) || p.matches_with(file_name, options))
}

/// Zip `source` into `dest_dir`.
///
/// `exclude` globs are matched against each entry's relative path and its
/// file name; an excluded directory is skipped entirely. The archive is
/// written to a `.part` file first and renamed when complete, and is never
/// stored inside itself. An existing archive of the same name is never
/// overwritten; a numeric suffix is added instead.
///
/// # Errors
///
/// Returns an error if the source is missing, an exclude glob is invalid,
/// or reading/writing fails.
pub fn create(
    source: &Path,
    dest_dir: &Path,
    exclude: &[String],
    at: DateTime<Local>,
) -> Result<BackupReport> {
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }
    let patterns = exclude
        .iter()
        .map(String::as_str)
        .map(Pattern::new)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    fs::create_dir_all(dest_dir)?;
    let source = source.canonicalize()?;
    let dest_dir = dest_dir.canonicalize()?;
    let archive = free_archive_path(&dest_dir, &archive_name(&source, at));
    let (part, file) = PartFile::create(archive.with_extension("zip.part"))?;

    let mut zip = ZipWriter::new(file);
    let mut files = 0;
    let mut bytes = 0;

    let walk = WalkDir::new(&source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let Ok(relative) = e.path().strip_prefix(&source) else {
                return true;
            };
            e.path() != archive
                && e.path() != part.path
                && !excluded(&patterns, &entry_name(relative))
        });

    for entry in walk {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(&source) else {
            continue;
        };
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(name, SimpleFileOptions::default())?;
        } else if entry.file_type().is_file() {
            let size = entry.metadata()?.len();
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(size >= u64::from(u32::MAX));
            zip.start_file(name, options)?;
            io::copy(&mut File::open(entry.path())?, &mut zip)?;
            files += 1;
            bytes += size;
        } else {
            debug!(path = %entry.path().display(), "skipping special file");
        }
    }

    zip.finish()?;
    part.finish(&archive)?;
    info!(archive = %archive.display(), files, bytes, "backup written");

    Ok(BackupReport {
        archive,
        files,
        bytes,
    })
}
