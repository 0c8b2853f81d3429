//! Jumps, aliases, project actions, plugins and packs.

pub mod alias;
pub mod init;
pub mod jump;
pub mod pack;
pub mod plugin;
pub mod project;
pub mod shell;

use crate::error::{Error, Result};

/// Resolve a user-typed name against known names.
///
/// An exact match wins; otherwise a case-insensitive prefix must match
/// exactly one name.
///
/// # Errors
///
/// Returns `NotFound` when nothing matches and `Ambiguous` when the prefix
/// matches several names.
pub fn resolve_name<'a, I>(kind: &'static str, names: I, wanted: &str) -> Result<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    if let Some(exact) = names.iter().find(|n| **n == wanted) {
        return Ok(*exact);
    }

    let lower = wanted.to_lowercase();
    let matches: Vec<&str> = names
        .into_iter()
        .filter(|n| n.to_lowercase().starts_with(&lower))
        .collect();

    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(Error::NotFound {
            kind,
            name: wanted.to_string(),
        }),
        _ => Err(Error::Ambiguous {
            kind,
            name: wanted.to_string(),
            candidates: matches.iter().map(ToString::to_string).collect(),
        }),
    }
}
