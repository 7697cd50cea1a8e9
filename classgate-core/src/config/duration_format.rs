//! Human-readable durations (`30s`, `2m`, `1h 30m`) for config fields.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Parses a humantime duration string.
///
/// # Errors
///
/// Returns the humantime parse error if the string is not a valid duration.
pub fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s.trim())
}

pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(|e| serde::de::Error::custom(format!("invalid duration '{s}': {e}")))
}
