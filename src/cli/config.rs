//! `dm config` command implementation.

use super::Context;
use crate::config::{LoadOptions, cache};
use crate::error::Result;
use std::path::Path;

/// Print the merged configuration document.
///
/// # Errors
///
/// Returns an error if the document cannot be encoded.
pub fn show(ctx: &Context) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&ctx.loaded.merged)?);
    if ctx.loaded.from_cache {
        eprintln!("(from cache {})", ctx.options.cache_path().display());
    }
    Ok(())
}

/// Print the config, home and cache locations.
pub fn path(profile: Option<String>) {
    let options = LoadOptions::from_env(profile, true);
    let exists = |p: &Path| if p.exists() { "" } else { "  (missing)" };

    let config = &options.config_path;
    let cache = options.cache_path();
    println!("config  {}{}", config.display(), exists(config));
    println!("home    {}{}", options.home.display(), exists(&options.home));
    println!("cache   {}{}", cache.display(), exists(&cache));
    if let Some(profile) = &options.profile {
        println!("profile {profile}");
    }
}

/// Delete cached merged documents.
///
/// # Errors
///
/// Returns an error if the home directory cannot be read or a cache file
/// cannot be removed.
pub fn clear_cache() -> Result<()> {
    let options = LoadOptions::from_env(None, true);
    let removed = cache::clear(&options.home)?;

    if removed == 0 {
        println!("No cache files.");
    } else {
        println!("Removed {removed} cache file(s).");
    }
    Ok(())
}
