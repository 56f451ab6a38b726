use crate::models::{TodoEntry, TodosByDate};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: NaiveDate,
    /// "Mon", "Tue", ...
    pub day: String,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub days: Vec<DayStats>,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: u32,
}

/// Rounded percentage, 0 when there is nothing to complete.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Completion figures over top-level todos; subtasks are not counted.
pub fn weekly_stats<T: TodoEntry>(buckets: &[TodosByDate<T>]) -> WeeklyStats {
    let days: Vec<DayStats> = buckets
        .iter()
        .map(|bucket| {
            let total = bucket.todos.len();
            let completed = bucket.todos.iter().filter(|t| t.todo().completed).count();
            DayStats {
                date: bucket.date,
                day: bucket.date.format("%a").to_string(),
                completed,
                total,
                completion_rate: completion_rate(completed, total),
            }
        })
        .collect();

    let total = days.iter().map(|d| d.total).sum();
    let completed = days.iter().map(|d| d.completed).sum();

    WeeklyStats {
        days,
        completed,
        total,
        completion_rate: completion_rate(completed, total),
    }
}
