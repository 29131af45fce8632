//! The fixed timestamp format used by every platform record.
//!
//! Records expose `created_at`/`updated_at` as RFC 3339 strings in UTC with
//! second precision, e.g. `2021-09-17T15:23:10Z`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::TypeError;

/// Render a store timestamp in the record format.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a record timestamp back into a UTC instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TypeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TypeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
