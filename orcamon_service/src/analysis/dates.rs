//! Timestamp normalization and date decomposition.
//!
//! The sightings feed mixes ISO 8601 timestamps ("2022-07-04T13:05:22.123Z")
//! with plain "YYYY-MM-DD HH:MM:SS" strings. `clean_timestamp` folds the
//! former into the latter; `decompose` then splits the result into the
//! calendar fields used by the dashboard.
//!
//! A timestamp that cannot be decomposed is an error. No date is ever
//! substituted for an unparseable one.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::DateParts;

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Wall-clock formats accepted after cleaning, tried in order. `%.f` also
/// matches a missing fraction.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Offset-carrying formats; the local wall-clock fields are kept.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M%:z"];

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalizes an ISO-like timestamp.
///
/// If `raw` contains a `T`, the `T` becomes a space, any `Z` is removed and
/// everything from the first `.` on is dropped. Strings without a `T` are
/// returned unchanged.
pub fn clean_timestamp(raw: &str) -> String {
    if !raw.contains('T') {
        return raw.to_string();
    }
    let spaced = raw.replace('T', " ").replace('Z', "");
    match spaced.split_once('.') {
        Some((head, _)) => head.to_string(),
        None => spaced,
    }
}

/// Three-letter English abbreviation for a month number (1..=12).
pub fn month_abbrev(month_number: u32) -> Option<&'static str> {
    let index = usize::try_from(month_number).ok()?.checked_sub(1)?;
    MONTH_ABBREVS.get(index).copied()
}

// ---------------------------------------------------------------------------
// Decomposition
// ---------------------------------------------------------------------------

/// Parses a cleaned timestamp. A trailing `Z` (left in place when the
/// input had no `T`) is ignored here only; the normalized text keeps it.
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.strip_suffix('Z').unwrap_or(text);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.naive_local());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Cleans `raw` and splits it into calendar fields.
///
/// Returns an error describing the input if no accepted format matches or
/// the date is not a real calendar date (e.g. month 13, Feb 30).
pub fn decompose(raw: &str) -> Result<DateParts, String> {
    let normalized = clean_timestamp(raw.trim());
    let dt = parse_datetime(&normalized)
        .ok_or_else(|| format!("cannot parse timestamp {:?}", raw))?;

    let month_number = dt.month();
    let month_abbrev = month_abbrev(month_number)
        .ok_or_else(|| format!("month out of range in {:?}", raw))?;

    Ok(DateParts {
        normalized,
        year: dt.year(),
        month_number,
        day: dt.day(),
        month_abbrev,
        time: NaiveTime::from_hms_opt(dt.hour(), dt.minute(), dt.second())
            .ok_or_else(|| format!("time out of range in {:?}", raw))?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
