//! `dm project` command implementation.

use super::Context;
use super::list::format_preview;
use crate::error::Result;
use crate::launcher::project;

/// Run a project action.
///
/// Without a project, lists projects. Without an action, lists the
/// project's actions. Returns the action's exit code.
///
/// # Errors
///
/// Returns an error if a name is unknown or ambiguous, the project path is
/// missing, or the command cannot be started.
pub fn run(
    ctx: &Context,
    name: Option<&str>,
    action: Option<&str>,
    args: &[String],
) -> Result<i32> {
    let config = ctx.config();
    let Some(name) = name else {
        print_projects(ctx);
        return Ok(0);
    };

    match action {
        Some(action) => project::run(config, name, action, args),
        None => {
            let (key, proj) = project::resolve(config, name)?;
            println!("{key}  {}", proj.path);
            if proj.actions.is_empty() {
                println!("  (no actions)");
            }
            let width = proj.actions.keys().map(String::len).max().unwrap_or(0);
            for (action, command) in &proj.actions {
                println!("  {action:<width$}  {}", format_preview(Some(command)));
            }
            Ok(0)
        }
    }
}

fn print_projects(ctx: &Context) {
    let projects = &ctx.config().projects;
    if projects.is_empty() {
        println!("No projects configured.");
        return;
    }

    let width = projects.keys().map(String::len).max().unwrap_or(0);
    for (name, proj) in projects {
        let about = proj.description.as_deref().unwrap_or(&proj.path);
        println!(
            "{name:<width$}  {} ({} action(s))",
            format_preview(Some(about)),
            proj.actions.len()
        );
    }
}
