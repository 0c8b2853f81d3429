//! `dm snapshot` command implementation.

use super::Context;
use crate::error::Result;
use crate::tools::snapshot;

/// Run the snapshot command.
///
/// # Errors
///
/// Returns an error if JSON encoding or saving fails.
pub fn run(ctx: &Context, version: &str, json: bool, save: bool) -> Result<()> {
    let snap = snapshot::capture(version);

    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print!("{}", snapshot::render_text(&snap));
    }

    if save {
        let path = snapshot::save(&snap, &ctx.home().join("snapshots"))?;
        eprintln!("Saved {}", path.display());
    }
    Ok(())
}
