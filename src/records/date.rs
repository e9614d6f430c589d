//! Tolerant parsing of server-supplied announcement dates

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Sort key for dates that match no known format; sorts last when descending
pub const UNPARSED_DATE: NaiveDateTime = NaiveDateTime::MIN;

/// Date-time layouts tried after ISO-8601, in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %H:%M:%S",
];

/// Date-only layouts, midnight assumed
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse `raw`, returning [`UNPARSED_DATE`] when nothing matches
///
/// Offsets in RFC 3339 input are dropped; the wall-clock time is kept, which
/// is what the site displays.
#[must_use]
pub fn parse_announcement_date(raw: &str) -> NaiveDateTime {
    let s = raw.trim();
    if s.is_empty() {
        return UNPARSED_DATE;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.naive_local();
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt;
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_time(chrono::NaiveTime::MIN);
        }
    }

    UNPARSED_DATE
}
