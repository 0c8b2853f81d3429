//! Project-scoped actions.

use super::{resolve_name, shell};
use crate::config::{Config, Project};
use crate::error::{Error, Result};
use crate::paths;
use std::path::PathBuf;
use tracing::info;

/// Look up a project by exact name or unique prefix.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous.
pub fn resolve<'a>(config: &'a Config, name: &str) -> Result<(&'a str, &'a Project)> {
    let key = resolve_name("project", config.projects.keys().map(String::as_str), name)?;
    Ok((key, &config.projects[key]))
}

/// Look up an action of a project.
///
/// # Errors
///
/// Returns an error if the action is unknown or ambiguous.
pub fn resolve_action<'a>(project: &'a Project, action: &str) -> Result<(&'a str, &'a str)> {
    let key = resolve_name("action", project.actions.keys().map(String::as_str), action)?;
    Ok((key, project.actions[key].as_str()))
}

/// Expanded project root, which must be an existing directory.
///
/// # Errors
///
/// Returns an error if the path is missing or not a directory.
pub fn root(project: &Project) -> Result<PathBuf> {
    let path = paths::expand(&project.path);
    if !path.exists() {
        return Err(Error::PathNotFound(path));
    }
    if !path.is_dir() {
        return Err(Error::NotADirectory(path));
    }
    Ok(path)
}

/// Run a project action inside the project root. Returns the exit code.
///
/// # Errors
///
/// Returns an error if the project or action is unknown, the root is
/// missing, or the shell cannot be spawned.
pub fn run(config: &Config, project: &str, action: &str, args: &[String]) -> Result<i32> {
    let (project_name, project) = resolve(config, project)?;
    let (action_name, command) = resolve_action(project, action)?;
    let dir = root(project)?;

    let line = shell::with_args(&paths::expand_vars(command), args);
    info!(project = project_name, action = action_name, command = %line, "running project action");
    shell::run(shell::shell_command(&line), Some(&dir))
}
