use crate::error::CoreError;
use crate::models::DayNote;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
impl super::DayNoteRepository for SqliteRepository {
    async fn upsert_day_note(&self, category_id: Uuid, date: NaiveDate, content: String) -> Result<DayNote, CoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(self.pool())
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound(format!("Category {} not found", category_id)));
        }

        let now = Utc::now();
        let note: DayNote = sqlx::query_as(
            r#"INSERT INTO day_notes (id, category_id, date, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (category_id, date) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(date)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        tracing::debug!(%category_id, %date, "upserted day note");
        Ok(note)
    }

    async fn find_day_notes(&self, category_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayNote>, CoreError> {
        let notes = sqlx::query_as(
            r#"SELECT * FROM day_notes
            WHERE category_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC
            "#,
        )
        .bind(category_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(notes)
    }

    async fn delete_day_note(&self, category_id: Uuid, date: NaiveDate) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM day_notes WHERE category_id = $1 AND date = $2")
            .bind(category_id)
            .bind(date)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("No note on {} for this category", date)));
        }
        Ok(())
    }
}
