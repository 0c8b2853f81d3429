//! dm - personal command-line launcher.
//!
//! Jumps to named folders, runs aliases, project actions and plugins,
//! serves pack knowledge docs, and bundles a few filesystem tools. All of
//! it is driven by a layered JSON configuration.

pub mod cli;
pub mod config;
pub mod doctor;
pub mod error;
pub mod launcher;
pub mod paths;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};
