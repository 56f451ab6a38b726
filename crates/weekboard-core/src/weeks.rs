//! ISO week generation.
//!
//! Weeks start on Monday. Week 1 of a year is the week containing its first
//! Thursday, so the ISO week-year of a boundary week can differ from the
//! calendar year of its Monday (2025-12-29 opens week 1 of 2026).

use crate::dates::start_of_week;
use crate::models::Week;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Default number of weeks produced by one generation request.
pub const DEFAULT_BATCH_SIZE: i64 = 12;

/// Number of weeks generated up front for a freshly created category.
pub const INITIAL_BATCH_SIZE: i64 = 52;

/// Largest batch a single generation request may ask for (ten years).
pub const MAX_BATCH_SIZE: i64 = 520;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub week_number: u32,
    pub year: i32,
}

impl WeekData {
    /// `None` when the Monday or Sunday of that week falls outside the
    /// representable date range.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let offset = Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let start_date = date.checked_sub_signed(offset)?;
        let end_date = start_date.checked_add_signed(Duration::days(6))?;
        let iso = start_date.iso_week();
        Some(Self {
            start_date,
            end_date,
            week_number: iso.week(),
            year: iso.year(),
        })
    }
}

/// Produces up to `count` consecutive weeks, the first being the week containing `start`.
///
/// Stops early rather than overflowing when the calendar runs out.
/// Deterministic: the caller upserts by (category, start date) to stay idempotent.
pub fn generate_weeks(start: NaiveDate, count: i64) -> Vec<WeekData> {
    if count <= 0 {
        return Vec::new();
    }

    let Some(first) = WeekData::containing(start) else {
        return Vec::new();
    };
    (0..count)
        .map_while(|i| {
            let monday = first.start_date.checked_add_signed(Duration::try_weeks(i)?)?;
            WeekData::containing(monday)
        })
        .collect()
}

pub fn current_week_start(today: NaiveDate) -> NaiveDate {
    start_of_week(today)
}

/// Inclusive on both ends.
pub fn is_date_in_week(date: NaiveDate, week_start: NaiveDate, week_end: NaiveDate) -> bool {
    date >= week_start && date <= week_end
}

/// Where the next generation batch starts: the day after the latest existing
/// week, or the current week when the category has none.
pub fn next_generation_start(last_week: Option<&Week>, today: NaiveDate) -> NaiveDate {
    match last_week {
        Some(week) => week.end_date.succ_opt().unwrap_or(week.end_date),
        None => current_week_start(today),
    }
}
