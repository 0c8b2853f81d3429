//! CLI command implementations.

pub mod alias;
pub mod backup;
pub mod clean;
pub mod config;
pub mod context;
pub mod doctor;
pub mod find;
pub mod init;
pub mod jump;
pub mod list;
pub mod menu;
pub mod pack;
pub mod plugin;
pub mod project;
pub mod recent;
pub mod rename;
pub mod snapshot;

pub use context::Context;
