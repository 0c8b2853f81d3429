//! Filesystem utilities.

pub mod backup;
pub mod cleanup;
pub mod filesearch;
pub mod recent;
pub mod renamer;
pub mod snapshot;

use crate::error::{Error, Result};
use chrono::Duration;

/// Parse a duration string like "7d", "24h", "30m".
///
/// A bare number is read as days.
///
/// # Errors
///
/// Returns an error if the duration format is invalid.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let parse_err = |_| Error::InvalidArgument(format!("invalid duration: {s}"));

    if let Some(stripped) = s.strip_suffix('d') {
        let num: i64 = stripped.parse().map_err(parse_err)?;
        Ok(Duration::days(num))
    } else if let Some(stripped) = s.strip_suffix('h') {
        let num: i64 = stripped.parse().map_err(parse_err)?;
        Ok(Duration::hours(num))
    } else if let Some(stripped) = s.strip_suffix('m') {
        let num: i64 = stripped.parse().map_err(parse_err)?;
        Ok(Duration::minutes(num))
    } else {
        let num: i64 = s.parse().map_err(parse_err)?;
        Ok(Duration::days(num))
    }
}

/// Parse a size like "512", "10k", "5M", "1G" (binary multiples).
///
/// # Errors
///
/// Returns an error if the size format is invalid.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim();
    let parse_err = |_| Error::InvalidArgument(format!("invalid size: {s}"));

    let (digits, multiplier) = match s.char_indices().last() {
        Some((idx, 'k' | 'K')) => (&s[..idx], 1024),
        Some((idx, 'm' | 'M')) => (&s[..idx], 1024 * 1024),
        Some((idx, 'g' | 'G')) => (&s[..idx], 1024 * 1024 * 1024),
        _ => (s, 1),
    };

    let num: u64 = digits.trim().parse().map_err(parse_err)?;
    num.checked_mul(multiplier)
        .ok_or_else(|| Error::InvalidArgument(format!("size too large: {s}")))
}

/// Human-readable byte count.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Display only
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
