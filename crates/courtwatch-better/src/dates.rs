//! Rolling window of days to query.
//!
//! Days are local wall-clock date-times rather than calendar dates: the
//! time-of-day of the anchor is carried through, and only the request
//! boundary truncates to `YYYY-MM-DD` (see [`format_query_date`]). A run
//! that straddles midnight can therefore see two adjacent days resolve to
//! dates that are not the ones the run started with.

use chrono::{Duration, Local, NaiveDateTime};

/// Returns `n` days starting at the current local time.
///
/// The anchor is read once per call, so consecutive elements are exactly
/// one day apart. Calling again rebuilds the sequence from a fresh "now".
pub fn next_n_days(n: u32) -> impl ExactSizeIterator<Item = NaiveDateTime> {
    days_from(Local::now().naive_local(), n)
}

/// Returns `n` days starting at `anchor`: element `i` is `anchor + i days`.
pub fn days_from(anchor: NaiveDateTime, n: u32) -> impl ExactSizeIterator<Item = NaiveDateTime> {
    (0..n).map(move |offset| anchor + Duration::days(i64::from(offset)))
}

/// Formats a day as the `date` query parameter the booking API expects.
#[must_use]
pub fn format_query_date(day: NaiveDateTime) -> String {
    day.format("%Y-%m-%d").to_string()
}
