//! Fixed `dd MMM yyyy` date handling (e.g. "12 Jun 2025").

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{LabError, Result};

/// chrono pattern for the literal `dd MMM yyyy` form used by the data files.
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Pattern produced by HTML date inputs.
const INPUT_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| LabError::InvalidDate {
        input: input.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Accepts either `yyyy-MM-dd` or `dd MMM yyyy`.
pub fn parse_input_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), INPUT_FORMAT).or_else(|_| parse_date(input))
}

/// Milliseconds since the epoch at UTC midnight; the numeric x-axis key of charts.
pub fn timestamp_millis(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .timestamp_millis()
}
