//! Error types for dm.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dm operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named entry (jump, alias, project, ...) does not exist.
    #[error("Unknown {kind}: {name}")]
    NotFound {
        /// What kind of entry was looked up.
        kind: &'static str,
        /// The name that was asked for.
        name: String,
    },

    /// A name prefix matched more than one entry.
    #[error("Ambiguous {kind} '{name}', candidates: {}", candidates.join(", "))]
    Ambiguous {
        /// What kind of entry was looked up.
        kind: &'static str,
        /// The prefix that was asked for.
        name: String,
        /// All entries the prefix matched.
        candidates: Vec<String>,
    },

    /// A configured path does not exist.
    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    /// A configured path is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Invalid glob or regex.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Invalid command-line value (duration, shell name, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A rename plan has conflicts and cannot be applied.
    #[error("Rename plan has {0} conflict(s); nothing was renamed")]
    RenameConflict(usize),

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Zip archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Interactive prompt error.
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::InvalidPattern(e.to_string())
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Self {
        Self::InvalidPattern(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_lists_candidates() {
        let err = Error::Ambiguous {
            kind: "jump",
            name: "do".to_string(),
            candidates: vec!["docs".to_string(), "downloads".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous jump 'do', candidates: docs, downloads"
        );
    }

    #[test]
    fn not_found_names_kind() {
        let err = Error::NotFound {
            kind: "alias",
            name: "gs".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown alias: gs");
    }

    #[test]
    fn regex_errors_become_invalid_pattern() {
        let err: Error = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }
}
