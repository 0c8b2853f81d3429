//! Named folder jumps.

use super::resolve_name;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::paths;
use std::path::PathBuf;

/// A jump with its expanded target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpEntry {
    /// Jump name.
    pub name: String,

    /// Expanded target path.
    pub path: PathBuf,

    /// Whether the target currently exists as a directory.
    pub exists: bool,
}

/// Resolve a jump by exact name or unique prefix.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous, or if the target
/// is missing or not a directory.
pub fn resolve(config: &Config, name: &str) -> Result<JumpEntry> {
    let key = resolve_name("jump", config.jumps.keys().map(String::as_str), name)?;
    let path = paths::expand(&config.jumps[key]);

    if !path.exists() {
        return Err(Error::PathNotFound(path));
    }
    if !path.is_dir() {
        return Err(Error::NotADirectory(path));
    }

    Ok(JumpEntry {
        name: key.to_string(),
        path,
        exists: true,
    })
}

/// All jumps, sorted by name.
#[must_use]
pub fn list(config: &Config) -> Vec<JumpEntry> {
    config
        .jumps
        .iter()
        .map(|(name, raw)| {
            let path = paths::expand(raw);
            JumpEntry {
                name: name.clone(),
                exists: path.is_dir(),
                path,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_with(dir: &TempDir) -> Config {
        let mut config = Config::default();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        config
            .jumps
            .insert("docs".to_string(), docs.to_string_lossy().into_owned());
        config.jumps.insert(
            "gone".to_string(),
            dir.path().join("gone").to_string_lossy().into_owned(),
        );
        config.jumps.insert(
            "file".to_string(),
            dir.path().join("notes.txt").to_string_lossy().into_owned(),
        );
        config
    }

    #[test]
    fn resolves_by_prefix() {
        let dir = TempDir::new().unwrap();
        let config = config_with(&dir);
        let entry = resolve(&config, "do").unwrap();
        assert_eq!(entry.name, "docs");
        assert_eq!(entry.path, dir.path().join("docs"));
    }

    #[test]
    fn missing_target_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = config_with(&dir);
        assert!(matches!(
            resolve(&config, "gone"),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn file_target_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let config = config_with(&dir);
        assert!(matches!(
            resolve(&config, "file"),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn list_flags_missing_targets() {
        let dir = TempDir::new().unwrap();
        let config = config_with(&dir);
        let entries = list(&config);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "file", "gone"]);
        assert!(entries[0].exists);
        assert!(!entries[1].exists);
        assert!(!entries[2].exists);
    }
}
