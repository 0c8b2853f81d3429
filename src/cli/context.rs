//! Shared state for commands: where dm lives and the loaded configuration.

use crate::config::{self, Config, LoadOptions, Loaded};
use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// Loaded configuration plus the options it was loaded with.
#[derive(Debug, Clone)]
pub struct Context {
    /// Paths and flags used for loading.
    pub options: LoadOptions,

    /// Effective configuration.
    pub loaded: Loaded,
}

impl Context {
    /// Load the configuration for the global `--profile`/`--no-cache` flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load(profile: Option<String>, no_cache: bool) -> Result<Self> {
        let options = LoadOptions::from_env(profile, !no_cache);
        let loaded = config::load(&options)?;
        Ok(Self { options, loaded })
    }

    /// Wrap an already-built configuration.
    #[must_use]
    pub fn with_config(config: Config, options: LoadOptions) -> Self {
        let merged = serde_json::to_value(&config).unwrap_or(Value::Null);
        Self {
            options,
            loaded: Loaded {
                config,
                merged,
                from_cache: false,
            },
        }
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.loaded.config
    }

    /// dm home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.options.home
    }
}
