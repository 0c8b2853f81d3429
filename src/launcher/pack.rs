//! Packs: bundled config defaults plus a folder of markdown knowledge docs.
//!
//! Layout:
//!
//! ```text
//! <packs dir>/<name>/pack.json        optional: { "description", "defaults" }
//! <packs dir>/<name>/knowledge/**/*.md
//! ```

use super::resolve_name;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A pack directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    /// Pack name (directory name).
    pub name: String,

    /// Pack directory.
    pub dir: PathBuf,

    /// Description from `pack.json`.
    pub description: Option<String>,

    /// Whether the config enables it.
    pub enabled: bool,
}

impl Pack {
    /// Knowledge folder of this pack.
    #[must_use]
    pub fn knowledge_dir(&self) -> PathBuf {
        self.dir.join("knowledge")
    }
}

/// A markdown knowledge doc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc {
    /// Path relative to the knowledge folder, `/`-separated, without `.md`.
    pub name: String,

    /// Full path.
    pub path: PathBuf,
}

/// A matching line from a knowledge search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeHit {
    /// Pack name.
    pub pack: String,

    /// Doc name.
    pub doc: String,

    /// 1-based line number.
    pub line: usize,

    /// The matching line, trimmed.
    pub text: String,
}

/// List packs in `packs_dir`, sorted by name. A missing directory is empty.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn list(packs_dir: &Path, enabled: &[String]) -> Result<Vec<Pack>> {
    let mut packs = Vec::new();
    if !packs_dir.is_dir() {
        debug!(dir = %packs_dir.display(), "packs directory missing");
        return Ok(packs);
    }

    for entry in fs::read_dir(packs_dir)? {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }
        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        packs.push(Pack {
            description: read_description(&dir.join("pack.json")),
            enabled: enabled.contains(&name),
            name,
            dir,
        });
    }

    packs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packs)
}

fn read_description(pack_file: &Path) -> Option<String> {
    let contents = fs::read_to_string(pack_file).ok()?;
    let value: Value = serde_json::from_str(&contents).ok()?;
    value
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Find a pack by exact name or unique prefix.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous.
pub fn find<'a>(packs: &'a [Pack], name: &str) -> Result<&'a Pack> {
    let key = resolve_name("pack", packs.iter().map(|p| p.name.as_str()), name)?;
    packs
        .iter()
        .find(|p| p.name == key)
        .ok_or_else(|| Error::NotFound {
            kind: "pack",
            name: name.to_string(),
        })
}

/// Markdown docs of a pack, sorted by name.
///
/// # Errors
///
/// Returns an error if the knowledge folder cannot be walked.
pub fn docs(pack: &Pack) -> Result<Vec<Doc>> {
    let root = pack.knowledge_dir();
    let mut docs = Vec::new();
    if !root.is_dir() {
        return Ok(docs);
    }

    for entry in WalkDir::new(&root).follow_links(false) {
        let entry = entry?;
        let path = entry.path();
        let is_markdown = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("md"));
        if !entry.file_type().is_file() || !is_markdown {
            continue;
        }
        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };
        let name = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        docs.push(Doc {
            name,
            path: path.to_path_buf(),
        });
    }

    docs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(docs)
}

/// Find a doc of a pack by exact name or unique prefix.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous.
pub fn find_doc(pack: &Pack, name: &str) -> Result<Doc> {
    let docs = docs(pack)?;
    let key = resolve_name("doc", docs.iter().map(|d| d.name.as_str()), name)?.to_string();
    docs.into_iter()
        .find(|d| d.name == key)
        .ok_or_else(|| Error::NotFound {
            kind: "doc",
            name: name.to_string(),
        })
}

/// Case-insensitive line search across the docs of `packs`.
///
/// Unreadable docs are skipped.
///
/// # Errors
///
/// Returns an error if a knowledge folder cannot be walked.
pub fn search(packs: &[&Pack], term: &str) -> Result<Vec<KnowledgeHit>> {
    let needle = term.to_lowercase();
    let mut hits = Vec::new();

    for pack in packs {
        for doc in docs(pack)? {
            let Ok(contents) = fs::read_to_string(&doc.path) else {
                debug!(path = %doc.path.display(), "skipping unreadable doc");
                continue;
            };
            for (idx, line) in contents.lines().enumerate() {
                if line.to_lowercase().contains(&needle) {
                    hits.push(KnowledgeHit {
                        pack: pack.name.clone(),
                        doc: doc.name.clone(),
                        line: idx + 1,
                        text: line.trim().to_string(),
                    });
                }
            }
        }
    }

    Ok(hits)
}
