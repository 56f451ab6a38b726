use crate::error::CoreError;
use crate::models::{DayTag, DayTagKind};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::DayTagRepository for SqliteRepository {
    async fn upsert_day_tag(&self, category_id: Uuid, date: NaiveDate, tag: DayTagKind) -> Result<DayTag, CoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(self.pool())
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound(format!("Category {} not found", category_id)));
        }

        // One tag per (category, date); a second tag replaces the first.
        let day_tag: DayTag = sqlx::query_as(
            r#"INSERT INTO day_tags (id, category_id, date, tag, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (category_id, date) DO UPDATE SET tag = excluded.tag
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(date)
        .bind(tag)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        tracing::debug!(%category_id, %date, %tag, "upserted day tag");
        Ok(day_tag)
    }

    async fn delete_day_tag(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM day_tags WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Day tag {} not found", id)));
        }
        Ok(())
    }

    async fn find_day_tags(&self, category_id: Uuid, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<DayTag>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM day_tags WHERE category_id = ");
        qb.push_bind(category_id);
        if let Some(start) = start {
            qb.push(" AND date >= ");
            qb.push_bind(start);
        }
        if let Some(end) = end {
            qb.push(" AND date <= ");
            qb.push_bind(end);
        }
        qb.push(" ORDER BY date ASC");

        let tags = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(tags)
    }
}
