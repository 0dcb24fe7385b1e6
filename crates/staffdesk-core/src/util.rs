//! Shared utility functions used across multiple modules.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 (what the remote store and this crate write) and the
/// naive `YYYY-MM-DD HH:MM:SS[.f]` form SQLite's `CURRENT_TIMESTAMP` produces,
/// which is interpreted as UTC. Values are truncated to microseconds so they
/// compare equal after a round trip through Postgres.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc).trunc_subsecs(6));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().trunc_subsecs(6))
}

/// Format a timestamp for local storage.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Last-modified time used for conflict resolution; absent means epoch.
pub fn modified_or_epoch(value: Option<DateTime<Utc>>) -> DateTime<Utc> {
    value.map_or(DateTime::UNIX_EPOCH, |value| value.trunc_subsecs(6))
}

/// Serde adapter for optional timestamps exchanged with the remote store.
///
/// Deserialization goes through [`parse_timestamp`] so `timestamp` and
/// `timestamptz` columns both decode, and values compare equal to the
/// microsecond-truncated local copies.
pub mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&super::format_timestamp(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{value}'"))),
        }
    }
}
