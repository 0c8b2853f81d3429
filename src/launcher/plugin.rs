//! External plugin scripts.
//!
//! Plugin directories are scanned non-recursively. The file stem is the
//! plugin name; when two directories provide the same name the earlier
//! directory wins.

use super::{resolve_name, shell};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// How a plugin is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// `*.ps1`, run with `pwsh`.
    PowerShell,
    /// `*.sh`, run with `sh`.
    Shell,
    /// `*.py`, run with `python3`.
    Python,
    /// Anything executable, run directly.
    Executable,
}

impl PluginKind {
    /// Classify a file, or `None` when it is not a plugin.
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ps1") => Some(Self::PowerShell),
            Some("sh") => Some(Self::Shell),
            Some("py") => Some(Self::Python),
            Some("exe" | "bat" | "cmd") if cfg!(windows) => Some(Self::Executable),
            _ if is_executable(path) => Some(Self::Executable),
            _ => None,
        }
    }

    /// Short label for listings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PowerShell => "pwsh",
            Self::Shell => "sh",
            Self::Python => "python",
            Self::Executable => "exec",
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

/// A discovered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Plugin name (file stem).
    pub name: String,

    /// Script path.
    pub path: PathBuf,

    /// Launcher kind.
    pub kind: PluginKind,
}

impl Plugin {
    /// Build the command that runs this plugin with `args`.
    #[must_use]
    pub fn command(&self, args: &[String]) -> Command {
        let mut cmd = match self.kind {
            PluginKind::PowerShell => {
                let mut cmd = Command::new("pwsh");
                cmd.args(["-NoProfile", "-File"]).arg(&self.path);
                cmd
            }
            PluginKind::Shell => {
                let mut cmd = Command::new("sh");
                cmd.arg(&self.path);
                cmd
            }
            PluginKind::Python => {
                let mut cmd = Command::new("python3");
                cmd.arg(&self.path);
                cmd
            }
            PluginKind::Executable => Command::new(&self.path),
        };
        cmd.args(args);
        cmd
    }
}

/// Discover plugins in `dirs`, sorted by name. Missing directories are skipped.
///
/// # Errors
///
/// Returns an error if an existing directory cannot be read.
pub fn discover(dirs: &[PathBuf]) -> Result<Vec<Plugin>> {
    let mut found: BTreeMap<String, Plugin> = BTreeMap::new();

    for dir in dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "plugin directory missing");
            continue;
        }
        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if !path.is_file() {
                continue;
            }
            let (Some(kind), Some(name)) = (
                PluginKind::detect(&path),
                path.file_stem().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            if found.contains_key(name) {
                debug!(plugin = name, path = %path.display(), "shadowed plugin");
                continue;
            }
            found.insert(
                name.to_string(),
                Plugin {
                    name: name.to_string(),
                    path: path.clone(),
                    kind,
                },
            );
        }
    }

    Ok(found.into_values().collect())
}

/// Find a plugin by exact name or unique prefix.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous.
pub fn find<'a>(plugins: &'a [Plugin], name: &str) -> Result<&'a Plugin> {
    let key = resolve_name("plugin", plugins.iter().map(|p| p.name.as_str()), name)?;
    plugins
        .iter()
        .find(|p| p.name == key)
        .ok_or_else(|| Error::NotFound {
            kind: "plugin",
            name: name.to_string(),
        })
}

/// Run a plugin by name. Returns its exit code.
///
/// # Errors
///
/// Returns an error if the plugin is unknown or cannot be spawned.
pub fn run(dirs: &[PathBuf], name: &str, args: &[String]) -> Result<i32> {
    let plugins = discover(dirs)?;
    let plugin = find(&plugins, name)?;
    info!(plugin = %plugin.name, path = %plugin.path.display(), "running plugin");
    shell::run(plugin.command(args), None)
}
