//! Well-known locations and path expansion.

use std::env;
use std::path::PathBuf;

/// Get the dm home directory.
///
/// Uses `DM_HOME` environment variable if set, otherwise `~/.dm`.
#[must_use]
pub fn dm_home() -> PathBuf {
    if let Ok(home) = env::var("DM_HOME") {
        PathBuf::from(home)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".dm")
    } else {
        PathBuf::from(".dm")
    }
}

/// Get the path to the base config file.
///
/// Uses `DM_CONFIG` if set, otherwise `<dm home>/config.json`.
#[must_use]
pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var("DM_CONFIG") {
        return PathBuf::from(path);
    }
    dm_home().join("config.json")
}

/// Expand `~` and environment variables in a configured path.
#[must_use]
pub fn expand(raw: &str) -> PathBuf {
    let expanded = expand_vars(raw);
    expand_tilde(&expanded)
}

fn expand_tilde(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\"))
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Expand `$VAR` and `${VAR}` using the process environment.
#[must_use]
pub fn expand_vars(raw: &str) -> String {
    expand_vars_with(raw, |name| env::var(name).ok())
}

/// Expand `$VAR` and `${VAR}` with a custom lookup.
///
/// Unknown variables are left verbatim.
pub fn expand_vars_with(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => out.push_str(&rest[pos..=pos + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
