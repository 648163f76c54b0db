//! Retention window parsing for source flags.

use std::collections::HashMap;
use std::time::Duration;

use crate::constants::RETENTION_FLAGS;
use crate::error::{CoreError, Result};

/// Parse a retention value such as `15d`, `360h` or `1h30m`.
///
/// A whole-day value `<n>d` is rewritten to `<n*24>h` before parsing; every
/// other value goes through the regular duration grammar.
pub fn parse_retention(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = |reason: String| CoreError::InvalidDuration { value: value.to_owned(), reason };

    let normalized = match value.strip_suffix('d') {
        Some(days) => {
            let days: u64 = days.parse().map_err(|e| invalid(format!("day count: {e}")))?;
            let hours = days.checked_mul(24).ok_or_else(|| invalid("overflow".to_owned()))?;
            format!("{hours}h")
        },
        None => value.to_owned(),
    };

    humantime::parse_duration(&normalized).map_err(|e| invalid(e.to_string()))
}

/// Look up and parse the retention window from a source's flag map.
///
/// Keys are tried in order. Blank and zero values are skipped: newer sources
/// still report the legacy key, set to `0s`, next to the real one.
pub fn retention_from_flags(flags: &HashMap<String, String>) -> Result<Duration> {
    for key in RETENTION_FLAGS {
        let Some(raw) = flags.get(*key).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let retention = parse_retention(raw)?;
        if retention.is_zero() {
            tracing::debug!(flag = *key, "ignoring zero retention flag");
            continue;
        }
        return Ok(retention);
    }
    Err(CoreError::RetentionNotFound(RETENTION_FLAGS.join(", ")))
}
