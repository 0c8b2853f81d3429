//! Configuration types and layered loading.
//!
//! The effective configuration is built from, lowest precedence first:
//! 1. Defaults of enabled packs (`<packs>/<name>/pack.json`)
//! 2. The base file (`DM_CONFIG` or `~/.dm/config.json`)
//! 3. Files matched by the base file's `include` globs
//! 4. The active profile (`profiles.<name>`)

pub mod cache;
pub mod loader;

pub use loader::{LoadOptions, Loaded, load, merge};

use crate::paths;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Active profile name.
    pub profile: Option<String>,

    /// Named folders.
    pub jumps: BTreeMap<String, String>,

    /// Named shell commands.
    pub aliases: BTreeMap<String, Alias>,

    /// Projects and their actions.
    pub projects: BTreeMap<String, Project>,

    /// Plugin discovery.
    pub plugins: PluginsConfig,

    /// Pack discovery.
    pub packs: PacksConfig,

    /// Include globs, relative to the base file.
    pub include: Vec<String>,

    /// Profile overlays.
    pub profiles: BTreeMap<String, Value>,

    /// File search defaults.
    pub search: SearchConfig,

    /// Backup defaults.
    pub backup: BackupConfig,

    /// Agent settings (checked by `doctor`).
    pub agent: AgentConfig,

    /// Extra doctor checks.
    pub doctor: DoctorConfig,
}

impl Config {
    /// Directories searched for plugins, in priority order.
    #[must_use]
    pub fn plugin_dirs(&self, home: &Path) -> Vec<PathBuf> {
        if self.plugins.dirs.is_empty() {
            vec![home.join("plugins")]
        } else {
            self.plugins.dirs.iter().map(|d| paths::expand(d)).collect()
        }
    }

    /// Directory holding packs.
    #[must_use]
    pub fn packs_dir(&self, home: &Path) -> PathBuf {
        self.packs
            .dir
            .as_deref()
            .map_or_else(|| home.join("packs"), paths::expand)
    }

    /// Directory receiving zip backups.
    #[must_use]
    pub fn backup_dest(&self, home: &Path) -> PathBuf {
        self.backup
            .dest
            .as_deref()
            .map_or_else(|| home.join("backups"), paths::expand)
    }
}

/// A shell alias: either a bare command line or a detailed entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Alias {
    /// `"gs": "git status"`
    Command(String),

    /// `"build": { "command": "make", "cwd": "~/src" }`
    Detailed {
        /// Command line.
        command: String,

        /// Working directory.
        #[serde(default)]
        cwd: Option<String>,

        /// Shown in listings.
        #[serde(default)]
        description: Option<String>,
    },
}

impl Alias {
    /// The command line to run.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Command(command) | Self::Detailed { command, .. } => command,
        }
    }

    /// Working directory, if any.
    #[must_use]
    pub fn cwd(&self) -> Option<&str> {
        match self {
            Self::Command(_) => None,
            Self::Detailed { cwd, .. } => cwd.as_deref(),
        }
    }

    /// Description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Command(_) => None,
            Self::Detailed { description, .. } => description.as_deref(),
        }
    }
}

/// A project directory with named actions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Project {
    /// Project root.
    pub path: String,

    /// Shown in listings.
    pub description: Option<String>,

    /// Action name to command line.
    pub actions: BTreeMap<String, String>,
}

/// Plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PluginsConfig {
    /// Plugin directories. Defaults to `<dm home>/plugins`.
    pub dirs: Vec<String>,
}

/// Pack configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PacksConfig {
    /// Packs directory. Defaults to `<dm home>/packs`.
    pub dir: Option<String>,

    /// Packs whose defaults and knowledge are active.
    pub enabled: Vec<String>,
}

/// File search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,

    /// Result limit when none is given.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
            ],
            max_results: 200,
        }
    }
}

/// Backup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackupConfig {
    /// Destination directory. Defaults to `<dm home>/backups`.
    pub dest: Option<String>,

    /// Globs (relative paths) left out of archives.
    pub exclude: Vec<String>,
}

/// Agent provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// `ollama`, `openai`, or `none`.
    pub provider: String,

    /// Ollama base URL.
    pub ollama_url: String,

    /// Environment variable holding the `OpenAI` key.
    pub openai_key_env: String,

    /// Model name.
    pub model: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            openai_key_env: "OPENAI_API_KEY".to_string(),
            model: None,
        }
    }
}

/// Extra doctor checks.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DoctorConfig {
    /// URLs that should answer a GET.
    pub endpoints: Vec<String>,

    /// Environment variables that should be set.
    pub env: Vec<String>,
}
