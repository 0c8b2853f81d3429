//! `dm pack` command implementation.

use super::Context;
use super::list::format_preview;
use crate::error::Result;
use crate::launcher::pack::{self, Pack};
use std::fs;

fn packs(ctx: &Context) -> Result<Vec<Pack>> {
    let config = ctx.config();
    pack::list(&config.packs_dir(ctx.home()), &config.packs.enabled)
}

/// List packs.
///
/// # Errors
///
/// Returns an error if the packs directory cannot be read.
pub fn list(ctx: &Context) -> Result<()> {
    let packs = packs(ctx)?;
    if packs.is_empty() {
        println!("No packs found.");
        println!(
            "\nPacks are read from: {}",
            ctx.config().packs_dir(ctx.home()).display()
        );
        return Ok(());
    }

    let width = packs.iter().map(|p| p.name.len()).max().unwrap_or(0);
    for p in &packs {
        let mark = if p.enabled { "*" } else { " " };
        println!(
            "{mark} {:<width$}  {}",
            p.name,
            format_preview(p.description.as_deref())
        );
    }
    Ok(())
}

/// List the knowledge docs of a pack.
///
/// # Errors
///
/// Returns an error if the pack is unknown or its docs cannot be read.
pub fn docs(ctx: &Context, name: &str) -> Result<()> {
    let packs = packs(ctx)?;
    let pack = pack::find(&packs, name)?;
    let docs = pack::docs(pack)?;

    if docs.is_empty() {
        println!("No knowledge docs in {}.", pack.name);
    }
    for doc in &docs {
        println!("{}", doc.name);
    }
    Ok(())
}

/// Print one knowledge doc.
///
/// # Errors
///
/// Returns an error if the pack or doc is unknown or cannot be read.
pub fn show(ctx: &Context, name: &str, doc: &str) -> Result<()> {
    let packs = packs(ctx)?;
    let pack = pack::find(&packs, name)?;
    let doc = pack::find_doc(pack, doc)?;
    print!("{}", fs::read_to_string(&doc.path)?);
    Ok(())
}

/// Search knowledge docs of enabled packs (or one named pack).
///
/// # Errors
///
/// Returns an error if a pack is unknown or a doc cannot be read.
pub fn grep(ctx: &Context, term: &str, only: Option<&str>) -> Result<()> {
    let packs = packs(ctx)?;
    let selected: Vec<&Pack> = match only {
        Some(name) => vec![pack::find(&packs, name)?],
        None => packs.iter().filter(|p| p.enabled).collect(),
    };

    let hits = pack::search(&selected, term)?;
    if hits.is_empty() {
        println!("No matches for '{term}'.");
    }
    for hit in &hits {
        println!("{}/{}:{}: {}", hit.pack, hit.doc, hit.line, hit.text);
    }
    Ok(())
}
