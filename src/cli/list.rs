//! `dm list` command implementation.

use super::Context;
use crate::error::Result;
use crate::launcher::{jump, pack, plugin};

/// Maximum length for description previews.
const PREVIEW_LEN: usize = 50;

/// Run the list command.
///
/// Shows everything dm can launch: jumps, aliases, projects, plugins and
/// packs.
///
/// # Errors
///
/// Returns an error if a plugin or pack directory cannot be read.
pub fn run(ctx: &Context) -> Result<()> {
    let config = ctx.config();
    let plugins = plugin::discover(&config.plugin_dirs(ctx.home()))?;
    let packs = pack::list(&config.packs_dir(ctx.home()), &config.packs.enabled)?;

    println!("{:<10} {:<24} Details", "Kind", "Name");
    println!("{}", "─".repeat(90));

    for entry in jump::list(config) {
        let missing = if entry.exists { "" } else { " (missing)" };
        println!(
            "{:<10} {:<24} {}{missing}",
            "jump",
            entry.name,
            entry.path.display()
        );
    }
    for (name, alias) in &config.aliases {
        let about = alias.description().unwrap_or(alias.command());
        println!("{:<10} {name:<24} {}", "alias", format_preview(Some(about)));
    }
    for (name, project) in &config.projects {
        let actions: Vec<&str> = project.actions.keys().map(String::as_str).collect();
        println!(
            "{:<10} {name:<24} {}",
            "project",
            format_preview(Some(&actions.join(", ")))
        );
    }
    for p in &plugins {
        println!("{:<10} {:<24} {}", "plugin", p.name, p.kind.label());
    }
    for p in &packs {
        let state = if p.enabled { "" } else { " (disabled)" };
        println!(
            "{:<10} {:<24} {}{state}",
            "pack",
            p.name,
            format_preview(p.description.as_deref())
        );
    }

    println!("{}", "─".repeat(90));
    println!(
        "{} jump(s), {} alias(es), {} project(s), {} plugin(s), {} pack(s)",
        config.jumps.len(),
        config.aliases.len(),
        config.projects.len(),
        plugins.len(),
        packs.len()
    );

    Ok(())
}

/// Format a description preview: first line only, truncated.
pub(crate) fn format_preview(text: Option<&str>) -> String {
    match text {
        Some(t) => {
            let first_line = t.lines().next().unwrap_or(t);
            if first_line.chars().count() > PREVIEW_LEN {
                let cut: String = first_line.chars().take(PREVIEW_LEN).collect();
                format!("{cut}...")
            } else {
                first_line.to_string()
            }
        }
        None => "(no description)".to_string(),
    }
}
