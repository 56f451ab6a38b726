//! Combined category views.
//!
//! A combined category owns no weeks or todos. Its content is synthesized from
//! the work and personal categories: weeks are aligned by ISO week number and
//! todos are interleaved by date, each labeled with its source category.
//!
//! Under [`RoleDetection::Name`] sources are found by case-insensitive
//! substring matching with first-match-wins, the same way names have always
//! been interpreted. Navigation relies on the week-number keying, so two
//! sources whose week boundaries diverge are shown with the work boundaries.

use crate::models::{
    Category, CategoryRole, RoleDetection, TodoEntry, TodoNode, TodoWithCategory, TodosByDate,
    TodosByDateWithCategory, Week,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub const FALLBACK_WORK_NAME: &str = "Work";
pub const FALLBACK_WORK_COLOR: &str = "#3B82F6";
pub const FALLBACK_PERSONAL_NAME: &str = "Personal";
pub const FALLBACK_PERSONAL_COLOR: &str = "#10B981";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceCategories<'a> {
    pub work: Option<&'a Category>,
    pub personal: Option<&'a Category>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchingWeeks {
    pub work: Option<Week>,
    pub personal: Option<Week>,
}

pub fn is_combined_category(category: Option<&Category>, detection: RoleDetection) -> bool {
    category.is_some_and(|c| c.has_role(CategoryRole::Combined, detection))
}

/// First work-like and first personal-like category in list order.
pub fn find_source_categories(categories: &[Category], detection: RoleDetection) -> SourceCategories<'_> {
    SourceCategories {
        work: categories
            .iter()
            .find(|c| c.has_role(CategoryRole::Work, detection)),
        personal: categories
            .iter()
            .find(|c| c.has_role(CategoryRole::Personal, detection)),
    }
}

/// Weeks numbered `week_number` in each source, if any.
pub fn find_matching_weeks(
    work_weeks: Option<&[Week]>,
    personal_weeks: Option<&[Week]>,
    week_number: Option<i32>,
) -> Option<MatchingWeeks> {
    let number = week_number.filter(|n| *n != 0)?;
    let find = |weeks: Option<&[Week]>| {
        weeks.and_then(|ws| ws.iter().find(|w| w.week_number == number).cloned())
    };

    Some(MatchingWeeks {
        work: find(work_weeks),
        personal: find(personal_weeks),
    })
}

/// One week per week number, sorted ascending. Work rows win over personal ones.
pub fn merge_weeks(work_weeks: Option<&[Week]>, personal_weeks: Option<&[Week]>) -> Vec<Week> {
    let mut by_number: BTreeMap<i32, Week> = BTreeMap::new();

    for week in work_weeks.unwrap_or_default() {
        by_number.insert(week.week_number, week.clone());
    }
    for week in personal_weeks.unwrap_or_default() {
        by_number
            .entry(week.week_number)
            .or_insert_with(|| week.clone());
    }

    by_number.into_values().collect()
}

/// [`merge_weeks`] applied to each ISO week-year separately, for listings
/// that span years where week numbers repeat.
pub fn merge_weeks_by_year(work_weeks: Option<&[Week]>, personal_weeks: Option<&[Week]>) -> Vec<Week> {
    let mut years: BTreeMap<i32, (Vec<Week>, Vec<Week>)> = BTreeMap::new();
    for week in work_weeks.unwrap_or_default() {
        years.entry(week.year).or_default().0.push(week.clone());
    }
    for week in personal_weeks.unwrap_or_default() {
        years.entry(week.year).or_default().1.push(week.clone());
    }

    years
        .into_values()
        .flat_map(|(work, personal)| merge_weeks(Some(work.as_slice()), Some(personal.as_slice())))
        .collect()
}

fn label(category: Option<&Category>, fallback_name: &str, fallback_color: &str) -> (String, String) {
    let name = category
        .and_then(Category::short_name)
        .unwrap_or(fallback_name)
        .to_string();
    let color = category
        .map(|c| c.color.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| fallback_color.to_string());
    (name, color)
}

/// Interleaves two sources' day buckets into one read-only list.
///
/// Work todos are appended before personal ones, then every bucket is stably
/// sorted by creation time and buckets are sorted by date.
pub fn merge_todos_by_date(
    work_todos: Vec<TodosByDate<TodoNode>>,
    personal_todos: Vec<TodosByDate<TodoNode>>,
    work_category: Option<&Category>,
    personal_category: Option<&Category>,
) -> Vec<TodosByDateWithCategory> {
    let mut by_date: HashMap<NaiveDate, Vec<TodoWithCategory>> = HashMap::new();

    let sources = [
        (work_todos, label(work_category, FALLBACK_WORK_NAME, FALLBACK_WORK_COLOR)),
        (
            personal_todos,
            label(personal_category, FALLBACK_PERSONAL_NAME, FALLBACK_PERSONAL_COLOR),
        ),
    ];

    for (buckets, (name, color)) in sources {
        for bucket in buckets {
            let entry = by_date.entry(bucket.date).or_default();
            entry.extend(bucket.todos.into_iter().map(|node| TodoWithCategory {
                node,
                category_name: name.clone(),
                category_color: color.clone(),
                read_only: true,
            }));
        }
    }

    let mut merged: Vec<TodosByDateWithCategory> = by_date
        .into_iter()
        .map(|(date, mut todos)| {
            todos.sort_by_key(|t| t.todo().created_at);
            TodosByDate::new(date, todos)
        })
        .collect();
    merged.sort_by_key(|bucket| bucket.date);
    merged
}
