//! The planner service: repository access behind a view cache, plus the
//! assembly of complete week views.
//!
//! Every read goes through [`ViewCache`] under a [`CacheKey`] derived from
//! the query. Mutations invalidate the keys they affect; completing a todo
//! is applied to the cached view first and rolled back by refetching if the
//! write fails.

use crate::cache::{CacheKey, ViewCache};
use crate::combined::{self, MatchingWeeks};
use crate::dates::format_week_display;
use crate::error::CoreError;
use crate::models::{
    Category, CategoryRole, DayNote, DayTag, DayTagKind, GeneratedWeeks, NewCategoryData,
    NewTodoData, ReorderUpdate, RoleDetection, Todo, TodoNode, TodoWithCategory, TodosByDate,
    TodosByDateWithTag, UpdateCategoryData, UpdateTodoData, Week, WeekQuery, WeekReflection,
    WeeksPage,
};
use crate::overlay::{merge_day_notes, merge_day_tags, missing_weekend_tags};
use crate::repository::Repository;
use crate::stats::{weekly_stats, WeeklyStats};
use crate::weeks::{DEFAULT_BATCH_SIZE, INITIAL_BATCH_SIZE};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::future::Future;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub role_detection: RoleDetection,
    /// Weeks per generation request when the caller gives no count.
    pub batch_size: i64,
    /// Weeks generated when a category is created.
    pub initial_batch_size: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            role_detection: RoleDetection::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            initial_batch_size: INITIAL_BATCH_SIZE,
        }
    }
}

/// Values held by the planner's cache, one variant per [`CacheKey`] kind.
#[derive(Debug, Clone)]
pub enum CachedView {
    Categories(Vec<Category>),
    Weeks(Vec<Week>),
    WeekTodos(Vec<TodosByDate>),
    DayTags(Vec<DayTag>),
    DayNotes(Vec<DayNote>),
    Reflection(Option<WeekReflection>),
}

/// A fully assembled week: day buckets with tags and notes, stats and the
/// reflection. Combined categories produce read-only views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub category: Category,
    pub week: Week,
    /// e.g. "Week 6 - 3 Feb to 9 Feb"
    pub label: String,
    pub days: Vec<TodosByDateWithTag<TodoWithCategory>>,
    pub stats: WeeklyStats,
    pub reflection: Option<WeekReflection>,
    pub read_only: bool,
}

pub struct Planner<R: Repository> {
    repo: R,
    config: PlannerConfig,
    cache: Mutex<ViewCache<CachedView>>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl<R: Repository> Planner<R> {
    pub fn new(repo: R, config: PlannerConfig) -> Self {
        Self {
            repo,
            config,
            cache: Mutex::new(ViewCache::new()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn detection(&self) -> RoleDetection {
        self.config.role_detection
    }

    pub fn is_combined(&self, category: &Category) -> bool {
        category.has_role(CategoryRole::Combined, self.detection())
    }

    async fn cached<T, Fut>(
        &self,
        key: CacheKey,
        project: fn(&CachedView) -> Option<T>,
        wrap: fn(T) -> CachedView,
        load: Fut,
    ) -> Result<T, CoreError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let epoch = {
            let cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&key).and_then(project) {
                return Ok(hit);
            }
            cache.epoch()
        };

        let value = load.await?;
        if !self.cache.lock().await.insert_if_current(key.clone(), wrap(value.clone()), epoch) {
            tracing::trace!(?key, "skipped caching a read that raced an invalidation");
        }
        Ok(value)
    }

    async fn invalidate_where<P>(&self, predicate: P)
    where
        P: FnMut(&CacheKey) -> bool,
    {
        self.cache.lock().await.invalidate_where(predicate);
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn categories(&self) -> Result<Vec<Category>, CoreError> {
        self.cached(
            CacheKey::Categories,
            |v| match v {
                CachedView::Categories(c) => Some(c.clone()),
                _ => None,
            },
            CachedView::Categories,
            self.repo.find_categories(),
        )
        .await
    }

    pub async fn category(&self, id: Uuid) -> Result<Category, CoreError> {
        self.categories()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::NotFound("Category not found".to_string()))
    }

    /// Creates a category and, unless it is combined, its first year of weeks.
    pub async fn create_category(&self, data: NewCategoryData) -> Result<Category, CoreError> {
        let category = self.repo.add_category(data).await?;

        if !self.is_combined(&category) {
            let generated = self
                .repo
                .generate_weeks(category.id, self.config.initial_batch_size, today())
                .await?;
            tracing::info!(
                category = %category.name,
                weeks = generated.weeks_created,
                "created category"
            );
        }

        self.invalidate_where(|key| matches!(key, CacheKey::Categories | CacheKey::Weeks { .. }))
            .await;
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, data: UpdateCategoryData) -> Result<Category, CoreError> {
        let category = self.repo.update_category(id, data).await?;
        // Renames and role changes can move a category in or out of merged lists.
        self.invalidate_where(|key| matches!(key, CacheKey::Categories | CacheKey::Weeks { .. }))
            .await;
        Ok(category)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        self.repo.delete_category(id).await?;
        self.cache.lock().await.clear();
        Ok(())
    }

    pub async fn seed_default_categories(&self) -> Result<Vec<Category>, CoreError> {
        let created = self.repo.seed_default_categories().await?;
        for category in &created {
            self.repo
                .generate_weeks(category.id, self.config.initial_batch_size, today())
                .await?;
        }
        self.invalidate_where(|key| matches!(key, CacheKey::Categories | CacheKey::Weeks { .. }))
            .await;
        Ok(created)
    }

    /// Fails with [`CoreError::ReadOnly`] for combined categories.
    pub async fn ensure_writable(&self, category_id: Uuid) -> Result<Category, CoreError> {
        let category = self.category(category_id).await?;
        if self.is_combined(&category) {
            return Err(CoreError::ReadOnly(format!(
                "'{}' is a combined view and cannot be modified",
                category.name
            )));
        }
        Ok(category)
    }

    // ------------------------------------------------------------------
    // Weeks
    // ------------------------------------------------------------------

    /// Weeks of a category, or the merged weeks of both sources for a
    /// combined category.
    pub async fn weeks(&self, category_id: Uuid, year: Option<i32>) -> Result<Vec<Week>, CoreError> {
        let category = self.category(category_id).await?;

        if !self.is_combined(&category) {
            return self
                .cached(
                    CacheKey::Weeks { category_id, year },
                    project_weeks,
                    CachedView::Weeks,
                    self.repo.list_weeks(category_id, year),
                )
                .await;
        }

        let categories = self.categories().await?;
        let sources = combined::find_source_categories(&categories, self.detection());
        let work_weeks = match sources.work {
            Some(work) => Some(self.source_weeks(work.id, year).await?),
            None => None,
        };
        let personal_weeks = match sources.personal {
            Some(personal) => Some(self.source_weeks(personal.id, year).await?),
            None => None,
        };

        Ok(match year {
            Some(_) => combined::merge_weeks(work_weeks.as_deref(), personal_weeks.as_deref()),
            None => combined::merge_weeks_by_year(work_weeks.as_deref(), personal_weeks.as_deref()),
        })
    }

    async fn source_weeks(&self, category_id: Uuid, year: Option<i32>) -> Result<Vec<Week>, CoreError> {
        self.cached(
            CacheKey::Weeks { category_id, year },
            project_weeks,
            CachedView::Weeks,
            self.repo.list_weeks(category_id, year),
        )
        .await
    }

    /// One page of weeks ordered by start date.
    pub async fn weeks_page(&self, category_id: Uuid, query: &WeekQuery) -> Result<WeeksPage, CoreError> {
        let category = self.category(category_id).await?;
        if !self.is_combined(&category) {
            return self.repo.find_weeks(category_id, query).await;
        }

        let merged = self.weeks(category_id, query.year).await?;
        let total = merged.len() as i64;
        let offset = query.offset.max(0);
        let weeks: Vec<Week> = merged
            .into_iter()
            .skip(offset as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        let has_more = offset + (weeks.len() as i64) < total;

        Ok(WeeksPage {
            weeks,
            total,
            has_more,
        })
    }

    /// Extends a category by `count` weeks (the configured batch size when
    /// absent) after its latest week.
    pub async fn generate_weeks(&self, category_id: Uuid, count: Option<i64>) -> Result<GeneratedWeeks, CoreError> {
        self.ensure_writable(category_id).await?;
        let count = count.unwrap_or(self.config.batch_size);
        let generated = self.repo.generate_weeks(category_id, count, today()).await?;

        self.invalidate_where(|key| matches!(key, CacheKey::Weeks { .. })).await;
        Ok(generated)
    }

    pub async fn week(&self, week_id: Uuid) -> Result<Week, CoreError> {
        self.repo
            .find_week_by_id(week_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Week not found".to_string()))
    }

    /// The week of `category_id` containing `date`, if generated.
    pub async fn week_containing(&self, category_id: Uuid, date: NaiveDate) -> Result<Option<Week>, CoreError> {
        let weeks = self.weeks(category_id, None).await?;
        Ok(weeks.into_iter().find(|w| w.contains(date)))
    }

    // ------------------------------------------------------------------
    // Todos
    // ------------------------------------------------------------------

    pub async fn week_todos(&self, week_id: Uuid) -> Result<Vec<TodosByDate>, CoreError> {
        self.cached(
            CacheKey::WeekTodos { week_id },
            |v| match v {
                CachedView::WeekTodos(t) => Some(t.clone()),
                _ => None,
            },
            CachedView::WeekTodos,
            self.repo.find_week_todos(week_id),
        )
        .await
    }

    pub async fn todo(&self, id: Uuid) -> Result<Todo, CoreError> {
        self.repo
            .find_todo_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Todo {} not found", id)))
    }

    async fn invalidate_week(&self, week_id: Uuid) {
        self.invalidate_where(|key| key.concerns_week(week_id)).await;
    }

    pub async fn add_todo(&self, data: NewTodoData) -> Result<Todo, CoreError> {
        let week = self.week(data.week_id).await?;
        self.ensure_writable(week.category_id).await?;

        let todo = self.repo.add_todo(data).await?;
        self.invalidate_week(todo.week_id).await;
        Ok(todo)
    }

    pub async fn update_todo(&self, id: Uuid, data: UpdateTodoData) -> Result<Todo, CoreError> {
        let todo = self.repo.update_todo(id, data).await?;
        self.invalidate_week(todo.week_id).await;
        Ok(todo)
    }

    pub async fn toggle_todo(&self, id: Uuid) -> Result<Todo, CoreError> {
        let current = self.todo(id).await?;
        let completed = !current.completed;
        self.set_todo_completed(current, completed).await
    }

    /// Marks a todo done or not done, showing the change in the cached week
    /// before the write lands.
    pub async fn set_todo_completed(&self, todo: Todo, completed: bool) -> Result<Todo, CoreError> {
        let week_id = todo.week_id;
        let id = todo.id;
        let key = CacheKey::WeekTodos { week_id };

        let mut cache = self.cache.lock().await;
        cache
            .optimistic(
                key,
                |view| {
                    if let CachedView::WeekTodos(buckets) = view {
                        mark_completed(buckets, id, completed);
                    }
                },
                self.repo.update_todo(
                    id,
                    UpdateTodoData {
                        completed: Some(completed),
                        ..Default::default()
                    },
                ),
                || async move {
                    let fresh = self.repo.find_week_todos(week_id).await?;
                    Ok(CachedView::WeekTodos(fresh))
                },
            )
            .await
    }

    pub async fn delete_todo(&self, id: Uuid) -> Result<(), CoreError> {
        let todo = self.todo(id).await?;
        self.repo.delete_todo(id).await?;
        self.invalidate_week(todo.week_id).await;
        Ok(())
    }

    pub async fn reorder_todos(&self, updates: &[ReorderUpdate]) -> Result<(), CoreError> {
        self.repo.reorder_todos(updates).await?;
        self.invalidate_where(|key| matches!(key, CacheKey::WeekTodos { .. })).await;
        Ok(())
    }

    /// Moves a todo to `position` (zero based) among its siblings of the same
    /// day and parent, renumbering the whole sibling list.
    pub async fn move_todo(&self, id: Uuid, position: usize) -> Result<Vec<ReorderUpdate>, CoreError> {
        let todo = self.todo(id).await?;
        let buckets = self.repo.find_week_todos(todo.week_id).await?;

        let mut siblings: Vec<Uuid> = match todo.parent_id {
            None => buckets
                .iter()
                .filter(|b| b.date == todo.due_date)
                .flat_map(|b| b.todos.iter().map(|n| n.todo.id))
                .collect(),
            Some(parent_id) => buckets
                .iter()
                .flat_map(|b| b.todos.iter())
                .filter(|n| n.todo.id == parent_id)
                .flat_map(|n| n.subtasks.iter().map(|s| s.id))
                .collect(),
        };

        siblings.retain(|sibling| *sibling != id);
        let position = position.min(siblings.len());
        siblings.insert(position, id);

        let updates: Vec<ReorderUpdate> = siblings
            .into_iter()
            .enumerate()
            .map(|(order, id)| ReorderUpdate {
                id,
                order: order as i64,
            })
            .collect();

        self.reorder_todos(&updates).await?;
        Ok(updates)
    }

    // ------------------------------------------------------------------
    // Day tags and notes
    // ------------------------------------------------------------------

    pub async fn day_tags(
        &self,
        category_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<DayTag>, CoreError> {
        self.cached(
            CacheKey::DayTags {
                category_id,
                start,
                end,
            },
            |v| match v {
                CachedView::DayTags(t) => Some(t.clone()),
                _ => None,
            },
            CachedView::DayTags,
            self.repo.find_day_tags(category_id, start, end),
        )
        .await
    }

    pub async fn set_day_tag(&self, category_id: Uuid, date: NaiveDate, tag: DayTagKind) -> Result<DayTag, CoreError> {
        let day_tag = self.repo.upsert_day_tag(category_id, date, tag).await?;
        self.invalidate_where(|key| {
            matches!(key, CacheKey::DayTags { .. }) && key.concerns_category(category_id) && key.covers_date(date)
        })
        .await;
        Ok(day_tag)
    }

    pub async fn delete_day_tag(&self, id: Uuid) -> Result<(), CoreError> {
        self.repo.delete_day_tag(id).await?;
        self.invalidate_where(|key| matches!(key, CacheKey::DayTags { .. })).await;
        Ok(())
    }

    /// Removes the tag on `date`, if any. Returns whether one existed.
    pub async fn clear_day_tag(&self, category_id: Uuid, date: NaiveDate) -> Result<bool, CoreError> {
        let tags = self.repo.find_day_tags(category_id, Some(date), Some(date)).await?;
        match tags.first() {
            Some(tag) => {
                self.delete_day_tag(tag.id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn day_notes(&self, category_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayNote>, CoreError> {
        self.cached(
            CacheKey::DayNotes {
                category_id,
                start,
                end,
            },
            |v| match v {
                CachedView::DayNotes(n) => Some(n.clone()),
                _ => None,
            },
            CachedView::DayNotes,
            self.repo.find_day_notes(category_id, start, end),
        )
        .await
    }

    pub async fn set_day_note(&self, category_id: Uuid, date: NaiveDate, content: String) -> Result<DayNote, CoreError> {
        let note = self.repo.upsert_day_note(category_id, date, content).await?;
        self.invalidate_where(|key| {
            matches!(key, CacheKey::DayNotes { .. }) && key.concerns_category(category_id) && key.covers_date(date)
        })
        .await;
        Ok(note)
    }

    pub async fn delete_day_note(&self, category_id: Uuid, date: NaiveDate) -> Result<(), CoreError> {
        self.repo.delete_day_note(category_id, date).await?;
        self.invalidate_where(|key| {
            matches!(key, CacheKey::DayNotes { .. }) && key.concerns_category(category_id) && key.covers_date(date)
        })
        .await;
        Ok(())
    }

    /// Tags the unlabeled weekend days of `week` for a work category.
    /// Returns the tags created; repeated calls create nothing.
    pub async fn reconcile_weekend_tags(&self, category: &Category, week: &Week) -> Result<Vec<DayTag>, CoreError> {
        let existing = self
            .day_tags(category.id, Some(week.start_date), Some(week.end_date))
            .await?;
        let missing = missing_weekend_tags(category, week, &existing, self.detection());

        let mut created = Vec::with_capacity(missing.len());
        for date in missing {
            created.push(self.set_day_tag(category.id, date, DayTagKind::Weekend).await?);
        }

        if !created.is_empty() {
            tracing::debug!(category = %category.name, count = created.len(), "auto-tagged weekend days");
        }
        Ok(created)
    }

    // ------------------------------------------------------------------
    // Reflections
    // ------------------------------------------------------------------

    pub async fn reflection(&self, week_id: Uuid) -> Result<Option<WeekReflection>, CoreError> {
        self.cached(
            CacheKey::Reflection { week_id },
            |v| match v {
                CachedView::Reflection(r) => Some(r.clone()),
                _ => None,
            },
            CachedView::Reflection,
            self.repo.find_reflection(week_id),
        )
        .await
    }

    pub async fn set_reflection(&self, week_id: Uuid, content: String) -> Result<WeekReflection, CoreError> {
        let reflection = self.repo.upsert_reflection(week_id, content).await?;
        self.cache.lock().await.invalidate(&CacheKey::Reflection { week_id });
        Ok(reflection)
    }

    // ------------------------------------------------------------------
    // Week views
    // ------------------------------------------------------------------

    /// Assembles the view of `week_id` as seen from `category_id`.
    ///
    /// For a combined category `week_id` may be a week of either source; the
    /// same ISO week of both sources is merged into a read-only view.
    pub async fn week_view(&self, category_id: Uuid, week_id: Uuid) -> Result<WeekView, CoreError> {
        let category = self.category(category_id).await?;
        let week = self.week(week_id).await?;

        if self.is_combined(&category) {
            return self.combined_week_view(category, week).await;
        }

        if week.category_id != category.id {
            return Err(CoreError::NotFound(format!(
                "Week not found in category '{}'",
                category.name
            )));
        }

        self.reconcile_weekend_tags(&category, &week).await?;

        let buckets = self.week_todos(week.id).await?;
        let stats = weekly_stats(&buckets);
        let name = category.short_name().unwrap_or(&category.name).to_string();
        let annotated: Vec<TodosByDate<TodoWithCategory>> = buckets
            .into_iter()
            .map(|bucket| {
                let todos = bucket
                    .todos
                    .into_iter()
                    .map(|node| TodoWithCategory {
                        node,
                        category_name: name.clone(),
                        category_color: category.color.clone(),
                        read_only: false,
                    })
                    .collect();
                TodosByDate::new(bucket.date, todos)
            })
            .collect();

        let days = self.overlay(category.id, &week, annotated).await?;
        let reflection = self.reflection(week.id).await?;

        Ok(WeekView {
            label: format_week_display(week.start_date, week.end_date, week.week_number),
            category,
            week,
            days,
            stats,
            reflection,
            read_only: false,
        })
    }

    async fn combined_week_view(&self, category: Category, week: Week) -> Result<WeekView, CoreError> {
        let categories = self.categories().await?;
        let sources = combined::find_source_categories(&categories, self.detection());

        let work_weeks = match sources.work {
            Some(work) => Some(self.source_weeks(work.id, Some(week.year)).await?),
            None => None,
        };
        let personal_weeks = match sources.personal {
            Some(personal) => Some(self.source_weeks(personal.id, Some(week.year)).await?),
            None => None,
        };

        let MatchingWeeks { work, personal } = combined::find_matching_weeks(
            work_weeks.as_deref(),
            personal_weeks.as_deref(),
            Some(week.week_number),
        )
        .unwrap_or_default();

        let work_todos = match &work {
            Some(w) => self.week_todos(w.id).await?,
            None => Vec::new(),
        };
        let personal_todos = match &personal {
            Some(p) => self.week_todos(p.id).await?,
            None => Vec::new(),
        };

        let merged = combined::merge_todos_by_date(work_todos, personal_todos, sources.work, sources.personal);
        let stats = weekly_stats(&merged);
        let days = self.overlay(category.id, &week, merged).await?;

        Ok(WeekView {
            label: format_week_display(week.start_date, week.end_date, week.week_number),
            category,
            week,
            days,
            stats,
            reflection: None,
            read_only: true,
        })
    }

    async fn overlay(
        &self,
        category_id: Uuid,
        week: &Week,
        buckets: Vec<TodosByDate<TodoWithCategory>>,
    ) -> Result<Vec<TodosByDateWithTag<TodoWithCategory>>, CoreError> {
        let tags = self
            .day_tags(category_id, Some(week.start_date), Some(week.end_date))
            .await?;
        let notes = self.day_notes(category_id, week.start_date, week.end_date).await?;
        Ok(merge_day_notes(merge_day_tags(buckets, &tags), &notes))
    }
}

fn project_weeks(view: &CachedView) -> Option<Vec<Week>> {
    match view {
        CachedView::Weeks(w) => Some(w.clone()),
        _ => None,
    }
}

fn mark_completed(buckets: &mut [TodosByDate<TodoNode>], id: Uuid, completed: bool) {
    let todos = buckets
        .iter_mut()
        .flat_map(|b| b.todos.iter_mut())
        .flat_map(|node| std::iter::once(&mut node.todo).chain(node.subtasks.iter_mut()));

    for todo in todos {
        if todo.id == id {
            todo.completed = completed;
            todo.completed_at = completed.then(chrono::Utc::now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::establish_connection;
    use crate::repository::SqliteRepository;
    use chrono::Utc;

    fn todo(id: Uuid, parent_id: Option<Uuid>) -> Todo {
        Todo {
            id,
            week_id: Uuid::nil(),
            content: "x".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            completed: false,
            completed_at: None,
            order: 0,
            parent_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn mark_completed_reaches_subtasks() {
        let parent = Uuid::now_v7();
        let child = Uuid::now_v7();
        let mut buckets = vec![TodosByDate::new(
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            vec![TodoNode {
                todo: todo(parent, None),
                subtasks: vec![todo(child, Some(parent))],
            }],
        )];

        mark_completed(&mut buckets, child, true);

        let node = &buckets[0].todos[0];
        assert!(!node.todo.completed);
        assert!(node.subtasks[0].completed);
        assert!(node.subtasks[0].completed_at.is_some());
    }

    fn categories_of(view: &CachedView) -> Option<Vec<Category>> {
        match view {
            CachedView::Categories(categories) => Some(categories.clone()),
            _ => None,
        }
    }

    async fn planner() -> (Planner<SqliteRepository>, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("planner.db");
        let pool = establish_connection(&db_path.to_string_lossy()).await.unwrap();
        (Planner::new(SqliteRepository::new(pool), PlannerConfig::default()), temp_dir)
    }

    #[tokio::test]
    async fn read_racing_a_mutation_is_not_cached() {
        let (planner, _temp_dir) = planner().await;

        // The mutation lands while the read is still loading.
        let load = async {
            planner.invalidate_where(|key| *key == CacheKey::Categories).await;
            Ok::<_, CoreError>(Vec::new())
        };
        let loaded = planner
            .cached(CacheKey::Categories, categories_of, CachedView::Categories, load)
            .await
            .unwrap();

        assert!(loaded.is_empty());
        assert!(planner.cache.lock().await.get(&CacheKey::Categories).is_none());

        let loaded = planner
            .cached(CacheKey::Categories, categories_of, CachedView::Categories, async {
                Ok::<_, CoreError>(Vec::new())
            })
            .await
            .unwrap();
        assert!(loaded.is_empty());
        assert!(planner.cache.lock().await.get(&CacheKey::Categories).is_some());
    }

    #[test]
    fn default_config_uses_standard_batches() {
        let config = PlannerConfig::default();
        assert_eq!(config.batch_size, 12);
        assert_eq!(config.initial_batch_size, 52);
        assert_eq!(config.role_detection, RoleDetection::Name);
    }
}
