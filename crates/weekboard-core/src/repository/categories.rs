use crate::error::CoreError;
use crate::models::{Category, CategoryRole, NewCategoryData, UpdateCategoryData, DEFAULT_CATEGORY_COLOR};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

/// Categories every fresh database starts with: (name, color, role).
pub const DEFAULT_CATEGORIES: [(&str, &str, CategoryRole); 2] = [
    ("Work Daily", "#DC2626", CategoryRole::Work),
    ("Personal Daily", "#7C3AED", CategoryRole::Personal),
];

#[async_trait]
impl super::CategoryRepository for SqliteRepository {
    async fn add_category(&self, data: NewCategoryData) -> Result<Category, CoreError> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Name is required".to_string()));
        }

        let mut tx = self.pool().begin().await?;

        let last_order: Option<i64> = sqlx::query_scalar("SELECT MAX(sort_order) FROM categories")
            .fetch_one(&mut *tx)
            .await?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            role: data.role.unwrap_or_else(|| CategoryRole::from_name(&name)),
            name,
            color: data
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            order: last_order.map_or(0, |o| o + 1),
            is_default: data.is_default,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"INSERT INTO categories (id, name, color, sort_order, is_default, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.color)
        .bind(category.order)
        .bind(category.is_default)
        .bind(category.role)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(category)
    }

    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>, CoreError> {
        let category = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(category)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, CoreError> {
        let category = sqlx::query_as("SELECT * FROM categories WHERE name = $1 COLLATE NOCASE")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(category)
    }

    async fn find_categories(&self) -> Result<Vec<Category>, CoreError> {
        let categories = sqlx::query_as("SELECT * FROM categories ORDER BY sort_order ASC, created_at ASC")
            .fetch_all(self.pool())
            .await?;
        Ok(categories)
    }

    async fn update_category(&self, id: Uuid, data: UpdateCategoryData) -> Result<Category, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE categories SET updated_at = ");
        qb.push_bind(Utc::now());

        // Empty strings leave the field untouched.
        if let Some(name) = data.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            qb.push(", name = ");
            qb.push_bind(name.to_string());
        }

        if let Some(color) = data.color.filter(|c| !c.is_empty()) {
            qb.push(", color = ");
            qb.push_bind(color);
        }

        if let Some(order) = data.order {
            qb.push(", sort_order = ");
            qb.push_bind(order);
        }

        if let Some(role) = data.role {
            qb.push(", role = ");
            qb.push_bind(role);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let category = qb
            .build_query_as::<Category>()
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Category {} not found", id)))?;

        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        let category: Category = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Category {} not found", id)))?;

        if category.is_default {
            return Err(CoreError::Forbidden("Cannot delete default categories".to_string()));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        tracing::debug!(category = %category.name, "deleted category");
        Ok(())
    }

    async fn seed_default_categories(&self) -> Result<Vec<Category>, CoreError> {
        let mut created = Vec::new();

        for (name, color, role) in DEFAULT_CATEGORIES {
            let exists: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE name = $1")
                .bind(name)
                .fetch_optional(self.pool())
                .await?;
            if exists.is_some() {
                continue;
            }

            let category = super::CategoryRepository::add_category(
                self,
                NewCategoryData {
                    name: name.to_string(),
                    color: Some(color.to_string()),
                    role: Some(role),
                    is_default: true,
                },
            )
            .await?;
            created.push(category);
        }

        tracing::debug!(created = created.len(), "seeded default categories");
        Ok(created)
    }
}
