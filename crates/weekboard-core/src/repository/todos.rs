use crate::dates::week_dates;
use crate::error::CoreError;
use crate::models::{NewTodoData, ReorderUpdate, Todo, TodoNode, TodosByDate, UpdateTodoData, Week};
use crate::repository::{short_id_pattern, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait]
impl super::TodoRepository for SqliteRepository {
    async fn add_todo(&self, data: NewTodoData) -> Result<Todo, CoreError> {
        let content = data.content.trim().to_string();
        if content.is_empty() {
            return Err(CoreError::InvalidInput("Todo content cannot be empty".to_string()));
        }

        let mut tx = self.pool().begin().await?;

        let week: Week = sqlx::query_as("SELECT * FROM weeks WHERE id = $1")
            .bind(data.week_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound("Week not found".to_string()))?;

        if !week.contains(data.due_date) {
            return Err(CoreError::InvalidInput(
                "Due date must be within the week range".to_string(),
            ));
        }

        if let Some(parent_id) = data.parent_id {
            let parent: Todo = sqlx::query_as("SELECT * FROM todos WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Parent todo {} not found", parent_id)))?;

            if parent.is_subtask() {
                return Err(CoreError::InvalidInput(
                    "Subtasks cannot have subtasks of their own".to_string(),
                ));
            }
            if parent.week_id != data.week_id {
                return Err(CoreError::InvalidInput(
                    "A subtask must belong to the same week as its parent".to_string(),
                ));
            }
        }

        let last_order: Option<i64> = sqlx::query_scalar(
            r#"SELECT MAX(sort_order) FROM todos
            WHERE week_id = $1 AND due_date = $2 AND parent_id IS $3
            "#,
        )
        .bind(data.week_id)
        .bind(data.due_date)
        .bind(data.parent_id)
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let todo = Todo {
            id: Uuid::now_v7(),
            week_id: data.week_id,
            content,
            due_date: data.due_date,
            completed: false,
            completed_at: None,
            order: last_order.map_or(0, |o| o + 1),
            parent_id: data.parent_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"INSERT INTO todos (id, week_id, content, due_date, completed, completed_at, sort_order, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(todo.id)
        .bind(todo.week_id)
        .bind(&todo.content)
        .bind(todo.due_date)
        .bind(todo.completed)
        .bind(todo.completed_at)
        .bind(todo.order)
        .bind(todo.parent_id)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(todo)
    }

    async fn find_todo_by_id(&self, id: Uuid) -> Result<Option<Todo>, CoreError> {
        let todo = sqlx::query_as("SELECT * FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(todo)
    }

    async fn find_todos_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Todo>, CoreError> {
        let pattern = short_id_pattern(short_id)?;
        let todos = sqlx::query_as("SELECT * FROM todos WHERE lower(hex(id)) LIKE $1")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(todos)
    }

    async fn update_todo(&self, id: Uuid, data: UpdateTodoData) -> Result<Todo, CoreError> {
        let now = Utc::now();
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE todos SET updated_at = ");
        qb.push_bind(now);

        if let Some(content) = data.content {
            let content = content.trim().to_string();
            if content.is_empty() {
                return Err(CoreError::InvalidInput("Todo content cannot be empty".to_string()));
            }
            qb.push(", content = ");
            qb.push_bind(content);
        }

        if let Some(order) = data.order {
            qb.push(", sort_order = ");
            qb.push_bind(order);
        }

        // completed_at tracks the completed flag.
        if let Some(completed) = data.completed {
            qb.push(", completed = ");
            qb.push_bind(completed);
            qb.push(", completed_at = ");
            qb.push_bind(completed.then_some(now));
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let todo = qb
            .build_query_as::<Todo>()
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Todo {} not found", id)))?;

        Ok(todo)
    }

    async fn delete_todo(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Todo {} not found", id)));
        }
        Ok(())
    }

    async fn reorder_todos(&self, updates: &[ReorderUpdate]) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;
        let now = Utc::now();

        for update in updates {
            let result = sqlx::query("UPDATE todos SET sort_order = $1, updated_at = $2 WHERE id = $3")
                .bind(update.order)
                .bind(now)
                .bind(update.id)
                .execute(&mut *tx)
                .await?;

            // Dropping the transaction rolls back the earlier updates.
            if result.rows_affected() == 0 {
                return Err(CoreError::NotFound(format!("Todo {} not found", update.id)));
            }
        }

        tx.commit().await?;
        tracing::debug!(count = updates.len(), "reordered todos");
        Ok(())
    }

    async fn find_week_todos(&self, week_id: Uuid) -> Result<Vec<TodosByDate>, CoreError> {
        let week: Week = sqlx::query_as("SELECT * FROM weeks WHERE id = $1")
            .bind(week_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound("Week not found".to_string()))?;

        let todos: Vec<Todo> = sqlx::query_as(
            "SELECT * FROM todos WHERE week_id = $1 ORDER BY due_date ASC, sort_order ASC, created_at ASC",
        )
        .bind(week_id)
        .fetch_all(self.pool())
        .await?;

        let (top_level, subtasks): (Vec<Todo>, Vec<Todo>) =
            todos.into_iter().partition(|todo| !todo.is_subtask());

        let mut subtasks_by_parent: HashMap<Uuid, Vec<Todo>> = HashMap::new();
        for subtask in subtasks {
            if let Some(parent_id) = subtask.parent_id {
                subtasks_by_parent.entry(parent_id).or_default().push(subtask);
            }
        }
        for children in subtasks_by_parent.values_mut() {
            children.sort_by_key(|t| (t.order, t.created_at));
        }

        let mut nodes: Vec<TodoNode> = top_level
            .into_iter()
            .map(|todo| TodoNode {
                subtasks: subtasks_by_parent.remove(&todo.id).unwrap_or_default(),
                todo,
            })
            .collect();

        let buckets = week_dates(week.start_date)
            .into_iter()
            .map(|date| {
                let (day, rest): (Vec<TodoNode>, Vec<TodoNode>) =
                    std::mem::take(&mut nodes).into_iter().partition(|n| n.todo.due_date == date);
                nodes = rest;
                TodosByDate::new(date, day)
            })
            .collect();

        Ok(buckets)
    }
}
