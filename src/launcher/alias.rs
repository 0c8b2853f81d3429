//! Aliased shell commands.

use super::{resolve_name, shell};
use crate::config::{Alias, Config};
use crate::error::{Error, Result};
use crate::paths;
use std::path::PathBuf;
use tracing::info;

/// Look up an alias by exact name or unique prefix.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous.
pub fn resolve<'a>(config: &'a Config, name: &str) -> Result<(&'a str, &'a Alias)> {
    let key = resolve_name("alias", config.aliases.keys().map(String::as_str), name)?;
    Ok((key, &config.aliases[key]))
}

/// Full command line for an alias with extra arguments appended.
#[must_use]
pub fn command_line(alias: &Alias, args: &[String]) -> String {
    shell::with_args(&paths::expand_vars(alias.command()), args)
}

/// Run an alias. Returns the command's exit code.
///
/// # Errors
///
/// Returns an error if the alias is unknown, its working directory is
/// missing, or the shell cannot be spawned.
pub fn run(config: &Config, name: &str, args: &[String]) -> Result<i32> {
    let (key, alias) = resolve(config, name)?;
    let cwd = alias.cwd().map(paths::expand);
    check_cwd(cwd.as_ref())?;

    let line = command_line(alias, args);
    info!(alias = key, command = %line, "running alias");
    shell::run(shell::shell_command(&line), cwd.as_deref())
}

fn check_cwd(cwd: Option<&PathBuf>) -> Result<()> {
    match cwd {
        Some(dir) if !dir.is_dir() => Err(Error::PathNotFound(dir.clone())),
        _ => Ok(()),
    }
}
