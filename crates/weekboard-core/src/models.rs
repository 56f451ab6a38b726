use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

// ============================================================================
// Categories
// ============================================================================

/// What a category stands for when views are assembled.
///
/// Stored explicitly on every category. Categories created without a role
/// get one inferred from their name through [`CategoryRole::from_name`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryRole {
    #[default]
    Standard,
    /// Virtual category that owns no weeks and shows work and personal merged.
    Combined,
    Work,
    Personal,
}

impl CategoryRole {
    /// Infers a role from a display name with the legacy substring rules.
    ///
    /// A name can match several patterns ("combinedwork"); the first match in
    /// the order combined, work, personal wins.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("combined") {
            CategoryRole::Combined
        } else if lower.contains("work") {
            CategoryRole::Work
        } else if lower.contains("personal") {
            CategoryRole::Personal
        } else {
            CategoryRole::Standard
        }
    }
}

impl std::fmt::Display for CategoryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryRole::Standard => write!(f, "standard"),
            CategoryRole::Combined => write!(f, "combined"),
            CategoryRole::Work => write!(f, "work"),
            CategoryRole::Personal => write!(f, "personal"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid category role: {0}")]
pub struct ParseCategoryRoleError(String);

impl FromStr for CategoryRole {
    type Err = ParseCategoryRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(CategoryRole::Standard),
            "combined" => Ok(CategoryRole::Combined),
            "work" => Ok(CategoryRole::Work),
            "personal" => Ok(CategoryRole::Personal),
            _ => Err(ParseCategoryRoleError(s.to_string())),
        }
    }
}

/// How category roles are recognised when assembling views.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleDetection {
    /// Case-insensitive substring matching on category names. A single
    /// category may be work-like and combined at the same time.
    #[default]
    Name,
    /// The stored `role` column only.
    Explicit,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid role detection mode: {0}")]
pub struct ParseRoleDetectionError(String);

impl FromStr for RoleDetection {
    type Err = ParseRoleDetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(RoleDetection::Name),
            "explicit" => Ok(RoleDetection::Explicit),
            _ => Err(ParseRoleDetectionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub is_default: bool,
    pub role: CategoryRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether this category plays `role` under the given detection mode.
    pub fn has_role(&self, role: CategoryRole, detection: RoleDetection) -> bool {
        match detection {
            RoleDetection::Explicit => self.role == role,
            RoleDetection::Name => {
                let lower = self.name.to_lowercase();
                match role {
                    CategoryRole::Combined => lower.contains("combined"),
                    CategoryRole::Work => lower.contains("work"),
                    CategoryRole::Personal => lower.contains("personal"),
                    CategoryRole::Standard => {
                        CategoryRole::from_name(&self.name) == CategoryRole::Standard
                    }
                }
            }
        }
    }

    /// First whitespace-delimited token of the name, used as a provenance label.
    pub fn short_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7(),
            name: String::new(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            order: 0,
            is_default: false,
            role: CategoryRole::Standard,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategoryData {
    pub name: String,
    pub color: Option<String>,
    /// Inferred from the name when absent.
    pub role: Option<CategoryRole>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryData {
    pub name: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
    pub role: Option<CategoryRole>,
}

// ============================================================================
// Weeks
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: Uuid,
    pub category_id: Uuid,
    /// Monday, inclusive
    pub start_date: NaiveDate,
    /// Sunday, inclusive
    pub end_date: NaiveDate,
    pub week_number: i32,
    /// ISO week-year, which can differ from the calendar year of `start_date`
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

impl Week {
    pub fn contains(&self, date: NaiveDate) -> bool {
        crate::weeks::is_date_in_week(date, self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeekGenerationLog {
    pub category_id: Uuid,
    pub last_generated_at: DateTime<Utc>,
    pub weeks_generated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekQuery {
    pub year: Option<i32>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for WeekQuery {
    fn default() -> Self {
        Self {
            year: None,
            limit: 12,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeksPage {
    pub weeks: Vec<Week>,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWeeks {
    pub weeks_created: usize,
    pub weeks: Vec<Week>,
}

// ============================================================================
// Todos
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub week_id: Uuid,
    pub content: String,
    pub due_date: NaiveDate,
    pub completed: bool,
    /// Set iff `completed`
    pub completed_at: Option<DateTime<Utc>>,
    /// Sort key within (week_id, due_date, parent_id)
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A top-level todo owning its ordered subtasks. Nesting stops at one level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoNode {
    #[serde(flatten)]
    pub todo: Todo,
    #[serde(default)]
    pub subtasks: Vec<Todo>,
}

impl TodoNode {
    pub fn leaf(todo: Todo) -> Self {
        Self {
            todo,
            subtasks: Vec::new(),
        }
    }
}

/// Todo annotated with the source category it was merged from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoWithCategory {
    #[serde(flatten)]
    pub node: TodoNode,
    pub category_name: String,
    pub category_color: String,
    /// Merged entries have no single owning week to write back to.
    pub read_only: bool,
}

/// Access to the underlying todo row of any bucket entry.
pub trait TodoEntry {
    fn todo(&self) -> &Todo;
}

impl TodoEntry for Todo {
    fn todo(&self) -> &Todo {
        self
    }
}

impl TodoEntry for TodoNode {
    fn todo(&self) -> &Todo {
        &self.todo
    }
}

impl TodoEntry for TodoWithCategory {
    fn todo(&self) -> &Todo {
        &self.node.todo
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodoData {
    pub week_id: Uuid,
    pub content: String,
    pub due_date: NaiveDate,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoData {
    pub content: Option<String>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderUpdate {
    pub id: Uuid,
    pub order: i64,
}

/// Todos of a single calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodosByDate<T = TodoNode> {
    pub date: NaiveDate,
    /// e.g. "15 December [Mon]"
    pub date_formatted: String,
    pub todos: Vec<T>,
}

impl<T> TodosByDate<T> {
    pub fn new(date: NaiveDate, todos: Vec<T>) -> Self {
        Self {
            date,
            date_formatted: crate::dates::format_date_header(date),
            todos,
        }
    }
}

pub type TodosByDateWithCategory = TodosByDate<TodoWithCategory>;

/// A day bucket with its day metadata attached.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodosByDateWithTag<T = TodoNode> {
    #[serde(flatten)]
    pub bucket: TodosByDate<T>,
    pub day_tag: Option<DayTag>,
    /// True whenever a tag is present
    pub is_collapsed: bool,
    pub day_note: Option<DayNote>,
}

// ============================================================================
// Day tags, notes and reflections
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum DayTagKind {
    Weekend,
    Vacation,
    Sick,
}

impl DayTagKind {
    pub const ALL: [DayTagKind; 3] = [DayTagKind::Weekend, DayTagKind::Vacation, DayTagKind::Sick];
}

impl std::fmt::Display for DayTagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayTagKind::Weekend => write!(f, "Weekend"),
            DayTagKind::Vacation => write!(f, "Vacation"),
            DayTagKind::Sick => write!(f, "Sick"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid tag '{0}'. Must be one of: Weekend, Vacation, Sick")]
pub struct ParseDayTagKindError(String);

impl FromStr for DayTagKind {
    type Err = ParseDayTagKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayTagKind::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDayTagKindError(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayTag {
    pub id: Uuid,
    pub category_id: Uuid,
    pub date: NaiveDate,
    pub tag: DayTagKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayNote {
    pub id: Uuid,
    pub category_id: Uuid,
    pub date: NaiveDate,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekReflection {
    pub id: Uuid,
    pub week_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Work Daily - 2025", CategoryRole::Work)]
    #[case("Personal Daily - 2025", CategoryRole::Personal)]
    #[case("My Combined View", CategoryRole::Combined)]
    #[case("combinedwork", CategoryRole::Combined)]
    #[case("Groceries", CategoryRole::Standard)]
    fn role_is_inferred_from_name(#[case] name: &str, #[case] expected: CategoryRole) {
        assert_eq!(CategoryRole::from_name(name), expected);
    }

    #[test]
    fn name_detection_allows_overlapping_roles() {
        let category = Category {
            name: "combinedwork".to_string(),
            role: CategoryRole::Combined,
            ..Default::default()
        };

        assert!(category.has_role(CategoryRole::Combined, RoleDetection::Name));
        assert!(category.has_role(CategoryRole::Work, RoleDetection::Name));
        assert!(!category.has_role(CategoryRole::Work, RoleDetection::Explicit));
    }

    #[rstest]
    #[case("Weekend", DayTagKind::Weekend)]
    #[case("vacation", DayTagKind::Vacation)]
    #[case("SICK", DayTagKind::Sick)]
    #[case(" Weekend ", DayTagKind::Weekend)]
    fn day_tag_kind_parses(#[case] input: &str, #[case] expected: DayTagKind) {
        assert_eq!(input.parse::<DayTagKind>(), Ok(expected));
    }

    #[test]
    fn unknown_day_tag_is_rejected() {
        assert!("Holiday".parse::<DayTagKind>().is_err());
    }

    #[test]
    fn short_name_is_first_token() {
        let category = Category {
            name: "Work Daily - 2025".to_string(),
            ..Default::default()
        };
        assert_eq!(category.short_name(), Some("Work"));
    }

    #[test]
    fn todo_node_serializes_flat_with_subtasks() {
        let todo = Todo {
            id: Uuid::now_v7(),
            week_id: Uuid::now_v7(),
            content: "Standup".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 4).unwrap(),
            completed: false,
            completed_at: None,
            order: 0,
            parent_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(TodoNode::leaf(todo)).unwrap();

        assert_eq!(json["content"], "Standup");
        assert_eq!(json["dueDate"], "2025-02-04");
        assert!(json["subtasks"].as_array().unwrap().is_empty());
    }
}
