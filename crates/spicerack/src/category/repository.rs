//! Spice category storage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateSpiceCategory, SpiceCategory, UpdateSpiceCategory};
use crate::ownership::OwnedStore;
use crate::user::UserId;

/// SQLite-backed store for spice categories.
///
/// Every statement carries `user_id = ?` next to the id, so a row is only
/// ever read or written on behalf of its owner.
#[derive(Debug, Clone)]
pub struct SpiceCategoryRepository {
    pool: SqlitePool,
}

impl SpiceCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_id() -> String {
        format!("cat_{}", nanoid::nanoid!(12))
    }
}

#[async_trait]
impl OwnedStore for SpiceCategoryRepository {
    type Record = SpiceCategory;
    type Create = CreateSpiceCategory;
    type Update = UpdateSpiceCategory;

    const KIND: &'static str = "spice_category";

    #[instrument(skip(self))]
    async fn list_owned(&self, owner: &UserId) -> Result<Vec<SpiceCategory>> {
        let categories = sqlx::query_as::<_, SpiceCategory>(
            r#"
            SELECT id, user_id, name, description, created_at, updated_at
            FROM spice_categories
            WHERE user_id = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list spice categories")?;

        Ok(categories)
    }

    #[instrument(skip(self, payload), fields(name = %payload.name))]
    async fn insert_owned(
        &self,
        owner: &UserId,
        payload: CreateSpiceCategory,
    ) -> Result<SpiceCategory> {
        let id = Self::generate_id();
        debug!("Creating spice category {} for {}", id, owner);

        let category = sqlx::query_as::<_, SpiceCategory>(
            r#"
            INSERT INTO spice_categories (id, user_id, name, description)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(owner)
        .bind(payload.name.trim())
        .bind(payload.description.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create spice category")?;

        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_owned(&self, owner: &UserId, id: &str) -> Result<Option<SpiceCategory>> {
        let category = sqlx::query_as::<_, SpiceCategory>(
            r#"
            SELECT id, user_id, name, description, created_at, updated_at
            FROM spice_categories
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch spice category")?;

        Ok(category)
    }

    #[instrument(skip(self, payload))]
    async fn update_owned(
        &self,
        owner: &UserId,
        id: &str,
        payload: UpdateSpiceCategory,
    ) -> Result<Option<SpiceCategory>> {
        let category = sqlx::query_as::<_, SpiceCategory>(
            r#"
            UPDATE spice_categories
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                updated_at = datetime('now')
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.description)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update spice category")?;

        Ok(category)
    }

    #[instrument(skip(self))]
    async fn delete_owned(&self, owner: &UserId, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM spice_categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .context("Failed to delete spice category")?;

        Ok(result.rows_affected() > 0)
    }
}
