//! Parsing of the free-form timestamp strings stored on journal records.
//!
//! Records carry a single display string such as `"01 Jan 2024, 09:00"`, written
//! with English month abbreviations whatever the device locale was. It is the
//! only ordering key a record has, so every date-based view goes through
//! [`parse`]. Failure to parse is an ordinary outcome (`None`): such records drop
//! out of calendar and ordering views and nothing is raised to the caller.

use crate::constants::{TIMESTAMP_DATE_FORMAT, TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_NO_COMMA};
use chrono::{NaiveDate, NaiveDateTime};

/// A successfully resolved record timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedDate {
    /// Calendar date, used for grouping.
    pub date: NaiveDate,
    /// Full instant, used for ordering.
    pub instant: NaiveDateTime,
}

/// Parses a record timestamp.
///
/// Tries `"dd MMM yyyy, HH:mm"` first, then `"dd MMM yyyy HH:mm"`.
/// Month names are matched in English.
///
/// # Examples
///
/// ```
/// use sentio::journal::date_resolver;
/// use chrono::NaiveDate;
///
/// let resolved = date_resolver::parse("01 Jan 2024, 09:00").unwrap();
/// assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
///
/// assert!(date_resolver::parse("01 Jan 2024 09:00").is_some());
/// assert!(date_resolver::parse("2024-01-01").is_none());
/// assert!(date_resolver::parse("").is_none());
/// ```
pub fn parse(timestamp: &str) -> Option<ResolvedDate> {
    [TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_NO_COMMA]
        .into_iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(timestamp, layout).ok())
        .map(|instant| ResolvedDate {
            date: instant.date(),
            instant,
        })
}

/// Calendar date of a timestamp, if it parses.
pub fn calendar_date(timestamp: &str) -> Option<NaiveDate> {
    parse(timestamp).map(|resolved| resolved.date)
}

/// Everything before the first comma, or the whole string when there is none.
///
/// A cheap day key for comma-formatted timestamps. For every timestamp that
/// also parses with the comma layout this equals [`format_date`] of the parsed
/// date, so it can be compared against a formatted selection.
///
/// ```
/// use sentio::journal::date_resolver::date_only;
///
/// assert_eq!(date_only("01 Jan 2024, 09:00"), "01 Jan 2024");
/// assert_eq!(date_only("no comma here"), "no comma here");
/// ```
pub fn date_only(timestamp: &str) -> &str {
    timestamp
        .split_once(',')
        .map_or(timestamp, |(before, _)| before)
}

/// Formats an instant the way records are written.
///
/// ```
/// use sentio::journal::date_resolver::format;
/// use chrono::NaiveDate;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(7, 4, 0).unwrap();
/// assert_eq!(format(at), "05 Mar 2024, 07:04");
/// ```
pub fn format(instant: NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Formats a calendar date as the day part of a record timestamp.
pub fn format_date(date: NaiveDate) -> String {
    date.format(TIMESTAMP_DATE_FORMAT).to_string()
}
