//! `dm run` command implementation.

use super::Context;
use super::list::format_preview;
use crate::error::Result;
use crate::launcher::alias;

/// Run an alias, or list aliases when no name is given.
///
/// Returns the exit code of the aliased command.
///
/// # Errors
///
/// Returns an error if the alias is unknown or its command cannot be started.
pub fn run(ctx: &Context, name: Option<&str>, args: &[String]) -> Result<i32> {
    let Some(name) = name else {
        print_list(ctx);
        return Ok(0);
    };
    alias::run(ctx.config(), name, args)
}

fn print_list(ctx: &Context) {
    let aliases = &ctx.config().aliases;
    if aliases.is_empty() {
        println!("No aliases configured.");
        return;
    }

    let width = aliases.keys().map(String::len).max().unwrap_or(0);
    for (name, alias) in aliases {
        let shown = alias.description().unwrap_or(alias.command());
        println!("{name:<width$}  {}", format_preview(Some(shown)));
    }
}
