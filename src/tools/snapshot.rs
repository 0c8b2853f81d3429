//! System snapshot.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// A point-in-time description of the machine and session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,

    /// Host name.
    pub hostname: Option<String>,

    /// Operating system (`linux`, `windows`, `macos`, ...).
    pub os: String,

    /// OS family (`unix`, `windows`).
    pub family: String,

    /// CPU architecture.
    pub arch: String,

    /// Logical CPUs available to the process.
    pub cpus: usize,

    /// Current user.
    pub user: Option<String>,

    /// Home directory.
    pub home: Option<PathBuf>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Login shell or command interpreter.
    pub shell: Option<String>,

    /// `PATH` entries in order.
    pub path_entries: Vec<PathBuf>,

    /// dm version.
    pub dm_version: String,
}

/// Capture a snapshot of the current process environment.
#[must_use]
pub fn capture(dm_version: &str) -> Snapshot {
    Snapshot {
        taken_at: Utc::now(),
        hostname: hostname(),
        os: env::consts::OS.to_string(),
        family: env::consts::FAMILY.to_string(),
        arch: env::consts::ARCH.to_string(),
        cpus: std::thread::available_parallelism().map_or(1, std::num::NonZero::get),
        user: env::var("USER").or_else(|_| env::var("USERNAME")).ok(),
        home: dirs::home_dir(),
        cwd: env::current_dir().ok(),
        shell: env::var("SHELL").or_else(|_| env::var("ComSpec")).ok(),
        path_entries: env::var_os("PATH")
            .map(|p| env::split_paths(&p).collect())
            .unwrap_or_default(),
        dm_version: dm_version.to_string(),
    }
}

fn hostname() -> Option<String> {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
        })
        .filter(|h| !h.is_empty())
}

/// Render a snapshot as aligned text.
#[must_use]
pub fn render_text(snapshot: &Snapshot) -> String {
    fn show<T: std::fmt::Display>(value: Option<T>) -> String {
        value.map_or_else(|| "(unknown)".to_string(), |v| v.to_string())
    }

    let mut out = String::new();
    let rows = [
        ("Taken", snapshot.taken_at.to_rfc3339()),
        ("Host", show(snapshot.hostname.as_deref())),
        (
            "OS",
            format!("{} ({}, {})", snapshot.os, snapshot.family, snapshot.arch),
        ),
        ("CPUs", snapshot.cpus.to_string()),
        ("User", show(snapshot.user.as_deref())),
        ("Home", show(snapshot.home.as_ref().map(|p| p.display()))),
        ("Cwd", show(snapshot.cwd.as_ref().map(|p| p.display()))),
        ("Shell", show(snapshot.shell.as_deref())),
        ("dm", snapshot.dm_version.clone()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<8} {value}");
    }

    let _ = writeln!(out, "PATH     {} entries", snapshot.path_entries.len());
    for entry in &snapshot.path_entries {
        let _ = writeln!(out, "         {}", entry.display());
    }
    out
}

/// Save a snapshot as JSON under `dir`. Returns the file written.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save(snapshot: &Snapshot, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "snapshot-{}.json",
        snapshot.taken_at.format("%Y%m%d-%H%M%S")
    ));
    let temp = path.with_extension("tmp");

    fs::write(&temp, serde_json::to_string_pretty(snapshot)?)?;
    fs::rename(&temp, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        Snapshot {
            taken_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            hostname: Some("box".to_string()),
            os: "linux".to_string(),
            family: "unix".to_string(),
            arch: "x86_64".to_string(),
            cpus: 8,
            user: None,
            home: Some(PathBuf::from("/home/ada")),
            cwd: None,
            shell: Some("/bin/zsh".to_string()),
            path_entries: vec![PathBuf::from("/usr/bin"), PathBuf::from("/bin")],
            dm_version: "0.3.0".to_string(),
        }
    }

    #[test]
    fn capture_fills_constants() {
        let snapshot = capture("9.9.9");
        assert_eq!(snapshot.os, env::consts::OS);
        assert_eq!(snapshot.arch, env::consts::ARCH);
        assert!(snapshot.cpus >= 1);
        assert_eq!(snapshot.dm_version, "9.9.9");
    }

    #[test]
    fn text_marks_unknowns() {
        let text = render_text(&sample());
        assert!(text.contains("Host     box"));
        assert!(text.contains("User     (unknown)"));
        assert!(text.contains("OS       linux (unix, x86_64)"));
        assert!(text.contains("PATH     2 entries"));
    }

    #[test]
    fn save_writes_timestamped_json() {
        let dir = TempDir::new().unwrap();
        let path = save(&sample(), dir.path()).unwrap();
        assert!(path.ends_with("snapshot-20260102-030405.json"));

        let back: Snapshot = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample());
    }
}
