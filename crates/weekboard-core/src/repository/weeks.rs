use crate::error::CoreError;
use crate::models::{Category, GeneratedWeeks, Week, WeekGenerationLog, WeekQuery, WeeksPage};
use crate::repository::{short_id_pattern, SqliteRepository};
use crate::weeks::{self, WeekData};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::WeekRepository for SqliteRepository {
    async fn generate_weeks(&self, category_id: Uuid, count: i64, today: NaiveDate) -> Result<GeneratedWeeks, CoreError> {
        let last: Option<Week> = sqlx::query_as(
            "SELECT * FROM weeks WHERE category_id = $1 ORDER BY start_date DESC LIMIT 1",
        )
        .bind(category_id)
        .fetch_optional(self.pool())
        .await?;

        let start = weeks::next_generation_start(last.as_ref(), today);
        super::WeekRepository::generate_weeks_from(self, category_id, start, count).await
    }

    async fn generate_weeks_from(&self, category_id: Uuid, start: NaiveDate, count: i64) -> Result<GeneratedWeeks, CoreError> {
        if count > weeks::MAX_BATCH_SIZE {
            return Err(CoreError::InvalidInput(format!(
                "Number of weeks must be at most {}, got {}",
                weeks::MAX_BATCH_SIZE,
                count
            )));
        }

        let mut tx = self.pool().begin().await?;

        let category: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(&mut *tx)
            .await?;
        if category.is_none() {
            return Err(CoreError::NotFound(format!("Category {} not found", category_id)));
        }

        // A non-positive count is a no-op, not an error.
        let batch: Vec<WeekData> = weeks::generate_weeks(start, count);
        let (Some(first), Some(last)) = (batch.first().copied(), batch.last().copied()) else {
            return Ok(GeneratedWeeks { weeks_created: 0, weeks: Vec::new() });
        };

        let now = Utc::now();
        let mut weeks_created = 0usize;
        for data in &batch {
            // Unique (category_id, start_date) keeps re-generation idempotent.
            let result = sqlx::query(
                r#"INSERT OR IGNORE INTO weeks (id, category_id, start_date, end_date, week_number, year, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(category_id)
            .bind(data.start_date)
            .bind(data.end_date)
            .bind(data.week_number as i32)
            .bind(data.year)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            weeks_created += result.rows_affected() as usize;
        }

        let generated: Vec<Week> = sqlx::query_as(
            r#"SELECT * FROM weeks
            WHERE category_id = $1 AND start_date >= $2 AND start_date <= $3
            ORDER BY start_date ASC
            "#,
        )
        .bind(category_id)
        .bind(first.start_date)
        .bind(last.start_date)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO week_generation_logs (category_id, last_generated_at, weeks_generated)
            VALUES ($1, $2, $3)
            ON CONFLICT (category_id) DO UPDATE SET
                last_generated_at = excluded.last_generated_at,
                weeks_generated = week_generation_logs.weeks_generated + excluded.weeks_generated
            "#,
        )
        .bind(category_id)
        .bind(now)
        .bind(weeks_created as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            %category_id,
            from = %first.start_date,
            requested = count,
            created = weeks_created,
            "generated weeks"
        );

        Ok(GeneratedWeeks {
            weeks_created,
            weeks: generated,
        })
    }

    async fn find_week_by_id(&self, id: Uuid) -> Result<Option<Week>, CoreError> {
        let week = sqlx::query_as("SELECT * FROM weeks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(week)
    }

    async fn find_weeks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Week>, CoreError> {
        let pattern = short_id_pattern(short_id)?;
        let weeks = sqlx::query_as("SELECT * FROM weeks WHERE lower(hex(id)) LIKE $1")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(weeks)
    }

    async fn find_weeks(&self, category_id: Uuid, query: &WeekQuery) -> Result<WeeksPage, CoreError> {
        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM weeks WHERE category_id = ");
        count_qb.push_bind(category_id);
        if let Some(year) = query.year {
            count_qb.push(" AND year = ");
            count_qb.push_bind(year);
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool()).await?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM weeks WHERE category_id = ");
        qb.push_bind(category_id);
        if let Some(year) = query.year {
            qb.push(" AND year = ");
            qb.push_bind(year);
        }
        qb.push(" ORDER BY start_date ASC LIMIT ");
        qb.push_bind(query.limit.max(0));
        qb.push(" OFFSET ");
        qb.push_bind(query.offset.max(0));

        let weeks: Vec<Week> = qb.build_query_as().fetch_all(self.pool()).await?;
        let has_more = query.offset.max(0) + (weeks.len() as i64) < total;

        Ok(WeeksPage {
            weeks,
            total,
            has_more,
        })
    }

    async fn list_weeks(&self, category_id: Uuid, year: Option<i32>) -> Result<Vec<Week>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM weeks WHERE category_id = ");
        qb.push_bind(category_id);
        if let Some(year) = year {
            qb.push(" AND year = ");
            qb.push_bind(year);
        }
        qb.push(" ORDER BY start_date ASC");

        let weeks = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(weeks)
    }

    async fn find_generation_log(&self, category_id: Uuid) -> Result<Option<WeekGenerationLog>, CoreError> {
        let log = sqlx::query_as("SELECT * FROM week_generation_logs WHERE category_id = $1")
            .bind(category_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(log)
    }
}
