//! Layered config loading.

use super::Config;
use super::cache::{self, CacheEntry, SourceStamp};
use crate::error::{Error, Result};
use crate::paths;
use serde::Deserialize as _;
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where to load from and how.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Base config file.
    pub config_path: PathBuf,

    /// dm home (packs and cache default here).
    pub home: PathBuf,

    /// Requested profile; `None` falls back to the document's `profile` key.
    pub profile: Option<String>,

    /// Read and write the merged-document cache.
    pub use_cache: bool,
}

impl LoadOptions {
    /// Options from the environment (`DM_HOME`, `DM_CONFIG`, `DM_PROFILE`).
    #[must_use]
    pub fn from_env(profile: Option<String>, use_cache: bool) -> Self {
        Self {
            config_path: paths::config_path(),
            home: paths::dm_home(),
            profile: profile.or_else(|| env::var("DM_PROFILE").ok()),
            use_cache,
        }
    }

    /// Path of the cache file for this config.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        cache::cache_path(&self.home, &self.config_path)
    }
}

/// Result of a load.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// Typed configuration.
    pub config: Config,

    /// Merged JSON document.
    pub merged: Value,

    /// Whether the merged document came from the cache.
    pub from_cache: bool,
}

/// Load the effective configuration.
///
/// # Errors
///
/// Returns an error if the base file, a pack file or an include cannot be
/// read or parsed, if an include glob is invalid, or if the requested
/// profile does not exist.
pub fn load(opts: &LoadOptions) -> Result<Loaded> {
    let cache_path = opts.cache_path();

    if opts.use_cache {
        if let Some(entry) = cache::read(&cache_path) {
            if entry.is_fresh(opts.profile.as_deref()) {
                debug!(path = %cache_path.display(), "config cache hit");
                let config = to_config(&entry.merged)?;
                return Ok(Loaded {
                    config,
                    merged: entry.merged,
                    from_cache: true,
                });
            }
            debug!(path = %cache_path.display(), "config cache stale");
        }
    }

    let entry = build(opts)?;
    let config = to_config(&entry.merged)?;

    if opts.use_cache {
        if let Err(e) = cache::write(&cache_path, &entry) {
            warn!(error = %e, path = %cache_path.display(), "failed to write config cache");
        }
    }

    Ok(Loaded {
        config,
        merged: entry.merged,
        from_cache: false,
    })
}

/// Merge the layers and record every source that went into them.
fn build(opts: &LoadOptions) -> Result<CacheEntry> {
    let base_dir = opts
        .config_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let mut sources = vec![SourceStamp::capture(&opts.config_path)];
    let base = if opts.config_path.exists() {
        read_object(&opts.config_path)?
    } else {
        debug!(path = %opts.config_path.display(), "no config file, using defaults");
        Value::Object(Map::new())
    };

    let mut merged = Value::Object(Map::new());

    // Pack defaults sit underneath everything else
    let packs_dir = base
        .pointer("/packs/dir")
        .and_then(Value::as_str)
        .map_or_else(|| opts.home.join("packs"), paths::expand);
    for name in string_array(&base, "/packs/enabled") {
        let pack_file = packs_dir.join(&name).join("pack.json");
        sources.push(SourceStamp::capture(&pack_file));
        if !pack_file.exists() {
            warn!(pack = %name, "enabled pack has no pack.json, skipping");
            continue;
        }
        let pack = read_object(&pack_file)?;
        if let Some(defaults) = pack.get("defaults") {
            debug!(pack = %name, "applying pack defaults");
            merge(&mut merged, defaults.clone());
        }
    }

    let patterns = string_array(&base, "/include");
    merge(&mut merged, base);

    let includes = expand_includes(&base_dir, &patterns)?;
    for include in &includes {
        debug!(path = %include.display(), "applying include");
        sources.push(SourceStamp::capture(include));
        merge(&mut merged, read_object(include)?);
    }

    let profile = opts.profile.clone().or_else(|| {
        merged
            .get("profile")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    if let Some(name) = &profile {
        apply_profile(&mut merged, name)?;
    }

    Ok(CacheEntry {
        profile: opts.profile.clone(),
        base_dir,
        patterns,
        includes,
        sources,
        merged,
    })
}

fn apply_profile(merged: &mut Value, name: &str) -> Result<()> {
    let overlay = merged
        .get("profiles")
        .and_then(|profiles| profiles.get(name))
        .cloned()
        .ok_or_else(|| Error::Config(format!("unknown profile: {name}")))?;

    debug!(profile = %name, "applying profile");
    merge(merged, overlay);
    if let Value::Object(map) = merged {
        map.insert("profile".to_string(), Value::String(name.to_string()));
    }
    Ok(())
}

/// Deep-merge `overlay` into `base`.
///
/// Objects merge key by key, `null` removes a key, anything else replaces.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if value.is_null() {
                    base_map.remove(&key);
                } else if let Some(existing) = base_map.get_mut(&key) {
                    merge(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Expand include globs relative to `base_dir`, sorted within each pattern.
///
/// `base_dir` is matched literally even if it contains glob characters.
///
/// # Errors
///
/// Returns an error if a pattern is not a valid glob.
pub fn expand_includes(base_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let base = PathBuf::from(glob::Pattern::escape(&base_dir.to_string_lossy()));
    for pattern in patterns {
        let full = base.join(paths::expand(pattern));
        let full = full.to_string_lossy();
        let mut matched: Vec<PathBuf> = glob::glob(&full)?
            .filter_map(std::result::Result::ok)
            .filter(|p| p.is_file())
            .collect();
        matched.sort();
        if matched.is_empty() {
            debug!(pattern = %pattern, "include matched nothing");
        }
        for path in matched {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn read_object(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    if !value.is_object() {
        return Err(Error::Config(format!(
            "{}: top level must be a JSON object",
            path.display()
        )));
    }
    Ok(value)
}

fn string_array(doc: &Value, pointer: &str) -> Vec<String> {
    doc.pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn to_config(merged: &Value) -> Result<Config> {
    Config::deserialize(merged).map_err(|e| Error::Config(e.to_string()))
}
