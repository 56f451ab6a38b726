use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Category, DayNote, DayTag, DayTagKind, GeneratedWeeks, NewCategoryData, NewTodoData,
    ReorderUpdate, Todo, TodosByDate, UpdateCategoryData, UpdateTodoData, Week,
    WeekGenerationLog, WeekQuery, WeekReflection, WeeksPage,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

// Re-export domain modules
pub mod categories;
pub mod day_notes;
pub mod day_tags;
pub mod reflections;
pub mod todos;
pub mod weeks;

/// Domain-specific trait for category operations
#[async_trait]
pub trait CategoryRepository {
    async fn add_category(&self, data: NewCategoryData) -> Result<Category, CoreError>;
    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>, CoreError>;
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, CoreError>;
    async fn find_categories(&self) -> Result<Vec<Category>, CoreError>;
    async fn update_category(&self, id: Uuid, data: UpdateCategoryData) -> Result<Category, CoreError>;
    async fn delete_category(&self, id: Uuid) -> Result<(), CoreError>;
    async fn seed_default_categories(&self) -> Result<Vec<Category>, CoreError>;
}

/// Domain-specific trait for week operations
#[async_trait]
pub trait WeekRepository {
    /// Generates `count` weeks following the category's latest week, or
    /// starting at the week containing `today` when it has none.
    async fn generate_weeks(&self, category_id: Uuid, count: i64, today: NaiveDate) -> Result<GeneratedWeeks, CoreError>;
    /// Upserts `count` weeks starting at the week containing `start`.
    async fn generate_weeks_from(&self, category_id: Uuid, start: NaiveDate, count: i64) -> Result<GeneratedWeeks, CoreError>;
    async fn find_week_by_id(&self, id: Uuid) -> Result<Option<Week>, CoreError>;
    async fn find_weeks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Week>, CoreError>;
    async fn find_weeks(&self, category_id: Uuid, query: &WeekQuery) -> Result<WeeksPage, CoreError>;
    async fn list_weeks(&self, category_id: Uuid, year: Option<i32>) -> Result<Vec<Week>, CoreError>;
    async fn find_generation_log(&self, category_id: Uuid) -> Result<Option<WeekGenerationLog>, CoreError>;
}

/// Domain-specific trait for todo operations
#[async_trait]
pub trait TodoRepository {
    async fn add_todo(&self, data: NewTodoData) -> Result<Todo, CoreError>;
    async fn find_todo_by_id(&self, id: Uuid) -> Result<Option<Todo>, CoreError>;
    async fn find_todos_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Todo>, CoreError>;
    async fn update_todo(&self, id: Uuid, data: UpdateTodoData) -> Result<Todo, CoreError>;
    async fn delete_todo(&self, id: Uuid) -> Result<(), CoreError>;
    async fn reorder_todos(&self, updates: &[ReorderUpdate]) -> Result<(), CoreError>;
    /// Seven day buckets, Monday to Sunday, of top-level todos with their subtasks.
    async fn find_week_todos(&self, week_id: Uuid) -> Result<Vec<TodosByDate>, CoreError>;
}

/// Domain-specific trait for day tag operations
#[async_trait]
pub trait DayTagRepository {
    async fn upsert_day_tag(&self, category_id: Uuid, date: NaiveDate, tag: DayTagKind) -> Result<DayTag, CoreError>;
    async fn delete_day_tag(&self, id: Uuid) -> Result<(), CoreError>;
    async fn find_day_tags(&self, category_id: Uuid, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<DayTag>, CoreError>;
}

/// Domain-specific trait for day note operations
#[async_trait]
pub trait DayNoteRepository {
    async fn upsert_day_note(&self, category_id: Uuid, date: NaiveDate, content: String) -> Result<DayNote, CoreError>;
    async fn find_day_notes(&self, category_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayNote>, CoreError>;
    async fn delete_day_note(&self, category_id: Uuid, date: NaiveDate) -> Result<(), CoreError>;
}

/// Domain-specific trait for weekly reflections
#[async_trait]
pub trait ReflectionRepository {
    async fn find_reflection(&self, week_id: Uuid) -> Result<Option<WeekReflection>, CoreError>;
    async fn upsert_reflection(&self, week_id: Uuid, content: String) -> Result<WeekReflection, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    CategoryRepository
    + WeekRepository
    + TodoRepository
    + DayTagRepository
    + DayNoteRepository
    + ReflectionRepository
    + Send
    + Sync
{
}

/// SQLite implementation of the repository pattern
#[derive(Clone)]
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl Repository for SqliteRepository {}

/// Turns a user-supplied short id ("0190a3f2", "0190a3f2-5b") into the hex
/// prefix of the stored blob.
pub(crate) fn short_id_pattern(short_id: &str) -> Result<String, CoreError> {
    let hex: String = short_id.chars().filter(|c| *c != '-').collect::<String>().to_lowercase();
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidInput(format!("'{}' is not a valid ID prefix", short_id)));
    }
    let mut pattern = String::with_capacity(hex.len() + 1);
    pattern.push_str(&hex);
    pattern.push('%');
    Ok(pattern)
}
