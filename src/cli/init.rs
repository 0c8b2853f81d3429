//! `dm init` command implementation.

use crate::error::Result;
use crate::launcher::init;

/// Print the shell integration for `shell`.
///
/// # Errors
///
/// Returns an error if the shell is not supported.
pub fn run(shell: &str, cmd: &str) -> Result<()> {
    print!("{}", init::generate(shell, cmd)?);
    Ok(())
}
