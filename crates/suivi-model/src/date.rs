//! Calendar date parsing and day normalization
//!
//! The API serializes dates in three shapes depending on the column type:
//! - plain dates: `2024-05-01`
//! - naive timestamps: `2024-05-01T08:30:00` or `2024-05-01 08:30:00`
//! - instants: `2024-04-30T22:00:00.000Z` (converted to the local calendar)
//!
//! Two normalizations are used downstream: start of day (00:00:00.000) and
//! end of day (23:59:59.999). Both are local wall-clock times.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Reason a date field could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Field absent, null or blank
    #[error("date is missing")]
    Missing,

    /// Field present but in no recognised format
    #[error("unparsable date: {0:?}")]
    Unparsable(String),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a wire value into a local timestamp.
///
/// Plain dates resolve to local midnight.
pub fn parse_timestamp(raw: Option<&str>) -> Result<NaiveDateTime, DateError> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Err(DateError::Missing),
        Some(v) => v,
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Local).naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(start_of_day)
        .map_err(|_| DateError::Unparsable(value.to_string()))
}

/// Parse a wire value into a local calendar date.
pub fn parse_date(raw: Option<&str>) -> Result<NaiveDate, DateError> {
    parse_timestamp(raw).map(|ts| ts.date())
}

/// 00:00:00.000 on `date`
#[inline]
#[must_use]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on `date`
#[inline]
#[must_use]
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_milli =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last_milli)
}

/// Whether a wire value counts as "set".
///
/// Blank strings are treated like null; anything else is set even if it
/// does not parse as a date.
#[inline]
#[must_use]
pub fn is_set(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| !v.trim().is_empty())
}
