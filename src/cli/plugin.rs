//! `dm plugin` command implementation.

use super::Context;
use crate::error::Result;
use crate::launcher::plugin;

/// Run a plugin, or list discovered plugins when no name is given.
///
/// # Errors
///
/// Returns an error if a plugin directory cannot be read, the plugin is
/// unknown, or it cannot be started.
pub fn run(ctx: &Context, name: Option<&str>, args: &[String]) -> Result<i32> {
    let dirs = ctx.config().plugin_dirs(ctx.home());
    if let Some(name) = name {
        return plugin::run(&dirs, name, args);
    }

    let plugins = plugin::discover(&dirs)?;
    if plugins.is_empty() {
        println!("No plugins found.");
        println!("\nPlugin directories:");
        for dir in &dirs {
            println!("  {}", dir.display());
        }
        return Ok(0);
    }

    let width = plugins.iter().map(|p| p.name.len()).max().unwrap_or(0);
    for p in &plugins {
        println!(
            "{:<width$}  {:<10}  {}",
            p.name,
            p.kind.label(),
            p.path.display()
        );
    }
    Ok(0)
}
