use crate::error::CoreError;
use crate::models::WeekReflection;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::ReflectionRepository for SqliteRepository {
    async fn find_reflection(&self, week_id: Uuid) -> Result<Option<WeekReflection>, CoreError> {
        let reflection = sqlx::query_as("SELECT * FROM week_reflections WHERE week_id = $1")
            .bind(week_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(reflection)
    }

    async fn upsert_reflection(&self, week_id: Uuid, content: String) -> Result<WeekReflection, CoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM weeks WHERE id = $1")
            .bind(week_id)
            .fetch_optional(self.pool())
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound("Week not found".to_string()));
        }

        let now = Utc::now();
        let reflection = sqlx::query_as(
            r#"INSERT INTO week_reflections (id, week_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (week_id) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(week_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(reflection)
    }
}
