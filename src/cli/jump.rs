//! `dm jump` command implementation.

use super::Context;
use crate::error::Result;
use crate::launcher::jump;

/// Run the jump command.
///
/// With a name, prints the resolved directory and nothing else, so a shell
/// function can `cd` into it. Without one, lists every jump.
///
/// # Errors
///
/// Returns an error if the name is unknown or ambiguous, or the target is
/// missing.
pub fn run(ctx: &Context, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let entry = jump::resolve(ctx.config(), name)?;
            println!("{}", entry.path.display());
        }
        None => print_list(ctx),
    }
    Ok(())
}

fn print_list(ctx: &Context) {
    let entries = jump::list(ctx.config());
    if entries.is_empty() {
        println!("No jumps configured.");
        return;
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in &entries {
        let missing = if entry.exists { "" } else { "  (missing)" };
        println!(
            "{:<width$}  {}{missing}",
            entry.name,
            entry.path.display()
        );
    }
}
