//! Child process helpers.

use crate::error::Result;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Build a command that runs `command_line` through the platform shell.
#[must_use]
pub fn shell_command(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command_line]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command_line]);
        cmd
    }
}

/// Quote one argument for the platform shell.
#[must_use]
pub fn quote_arg(arg: &str) -> String {
    if cfg!(windows) {
        if arg.is_empty() || arg.contains([' ', '\t', '"']) {
            format!("\"{}\"", arg.replace('"', "\\\""))
        } else {
            arg.to_string()
        }
    } else if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Append quoted extra arguments to a command line.
#[must_use]
pub fn with_args(command_line: &str, args: &[String]) -> String {
    let mut line = command_line.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg));
    }
    line
}

/// Run a command to completion, inheriting stdio. Returns its exit code.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned.
pub fn run(mut cmd: Command, cwd: Option<&Path>) -> Result<i32> {
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    debug!(command = ?cmd, "spawning");

    let status = cmd.status()?;
    let code = status.code().unwrap_or(1);
    info!(code, "command finished");
    Ok(code)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plain_args_are_not_quoted() {
        assert_eq!(quote_arg("src/main.rs"), "src/main.rs");
        assert_eq!(quote_arg("--flag=1"), "--flag=1");
    }

    #[test]
    fn special_args_are_single_quoted() {
        assert_eq!(quote_arg("two words"), "'two words'");
        assert_eq!(quote_arg(""), "''");
        assert_eq!(quote_arg("it's"), r"'it'\''s'");
        assert_eq!(quote_arg("$HOME"), "'$HOME'");
    }

    #[test]
    fn with_args_appends_in_order() {
        let line = with_args("git log", &["-n".to_string(), "5".to_string()]);
        assert_eq!(line, "git log -n 5");
    }

    #[test]
    fn run_propagates_exit_code() {
        assert_eq!(run(shell_command("exit 3"), None).unwrap(), 3);
        assert_eq!(run(shell_command("true"), None).unwrap(), 0);
    }

    #[test]
    fn run_uses_cwd() {
        let dir = TempDir::new().unwrap();
        let code = run(shell_command("touch here.txt"), Some(dir.path())).unwrap();
        assert_eq!(code, 0);
        assert!(dir.path().join("here.txt").exists());
    }
}
