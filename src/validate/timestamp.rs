//! Timestamp parsing for availability events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// How strictly the `timestamp` field of an event is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Anything a common date parser accepts.
    #[default]
    Lenient,
    /// Only the canonical `YYYY-MM-DDTHH:MM:SS.sssZ` form.
    StrictIso,
}

/// Offset-less layouts, read as UTC. `%.f` makes the fraction optional.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl TimestampPolicy {
    /// Parse `raw` under this policy.
    pub fn parse(self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            TimestampPolicy::Lenient => parse_lenient(raw),
            TimestampPolicy::StrictIso => parse_strict_iso(raw),
        }
    }

    pub(crate) fn error_message(self) -> &'static str {
        match self {
            TimestampPolicy::Lenient => "timestamp must be a valid date/time string",
            TimestampPolicy::StrictIso => "timestamp must be an ISO string",
        }
    }
}

fn parse_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_strict_iso(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw).ok()?.with_timezone(&Utc);
    (parsed.to_rfc3339_opts(SecondsFormat::Millis, true) == raw).then_some(parsed)
}
