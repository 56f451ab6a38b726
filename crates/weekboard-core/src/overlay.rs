//! Attaches per-date metadata (day tags, day notes) to date buckets, and the
//! weekend auto-tagging policy for work categories.

use crate::dates::start_of_week;
use crate::models::{
    Category, CategoryRole, DayNote, DayTag, RoleDetection, TodosByDate, TodosByDateWithTag, Week,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_work_category(category: Option<&Category>, detection: RoleDetection) -> bool {
    category.is_some_and(|c| c.has_role(CategoryRole::Work, detection))
}

/// Saturday and Sunday among the seven days starting at `week_start`.
pub fn weekend_dates_for_week(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..7)
        .map(|offset| week_start + Duration::days(offset))
        .filter(|date| is_weekend(*date))
        .collect()
}

/// Attaches the matching tag to each bucket; a tagged day starts collapsed.
pub fn merge_day_tags<T>(buckets: Vec<TodosByDate<T>>, tags: &[DayTag]) -> Vec<TodosByDateWithTag<T>> {
    buckets
        .into_iter()
        .map(|bucket| {
            let day_tag = tags.iter().find(|tag| tag.date == bucket.date).cloned();
            TodosByDateWithTag {
                is_collapsed: day_tag.is_some(),
                day_tag,
                day_note: None,
                bucket,
            }
        })
        .collect()
}

/// Attaches at most one note per bucket, matched by date.
pub fn merge_day_notes<T>(
    days: Vec<TodosByDateWithTag<T>>,
    notes: &[DayNote],
) -> Vec<TodosByDateWithTag<T>> {
    days.into_iter()
        .map(|mut day| {
            day.day_note = notes.iter().find(|note| note.date == day.bucket.date).cloned();
            day
        })
        .collect()
}

/// Weekend dates of `week` that a work category still needs tagged.
///
/// Empty for any other category, and once both days carry a tag (of any kind).
pub fn missing_weekend_tags(
    category: &Category,
    week: &Week,
    existing: &[DayTag],
    detection: RoleDetection,
) -> Vec<NaiveDate> {
    if !is_work_category(Some(category), detection) {
        return Vec::new();
    }

    weekend_dates_for_week(start_of_week(week.start_date))
        .into_iter()
        .filter(|date| {
            !existing
                .iter()
                .any(|tag| tag.category_id == category.id && tag.date == *date)
        })
        .collect()
}
