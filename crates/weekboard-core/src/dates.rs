//! Date formatting and parsing shared by the API, the CLI and the views.
//!
//! API dates and bucket keys are always `YYYY-MM-DD`.

use crate::error::CoreError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// "2025-01-07"
pub fn format_date_for_api(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Parses an API date. Full RFC 3339 timestamps are accepted and reduced to
/// their UTC calendar date.
pub fn parse_api_date(input: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, API_DATE_FORMAT)
        .or_else(|_| {
            DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .map_err(|_| CoreError::InvalidDate(input.to_string()))
}

/// "15 December [Mon]"
pub fn format_date_header(date: NaiveDate) -> String {
    format!("{} [{}]", date.format("%-d %B"), date.format("%a"))
}

/// "Week 6 - 3 Feb to 9 Feb"
pub fn format_week_display(start_date: NaiveDate, end_date: NaiveDate, week_number: i32) -> String {
    format!(
        "Week {} - {} to {}",
        week_number,
        start_date.format("%-d %b"),
        end_date.format("%-d %b")
    )
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The seven dates, Monday to Sunday, of the week containing `date`.
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let start = start_of_week(date);
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}
