//! Product storage.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateProduct, Product, UpdateProduct};

/// Repository for the shared product catalog.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product")?;

        Ok(product)
    }

    /// Insert a product. The payload must already be validated.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateProduct) -> Result<Product> {
        let id = format!("prd_{}", nanoid::nanoid!(12));
        debug!("Creating product: {}", id);

        let price = request.price.context("Product price is missing")?;
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, description, price, stock)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, description, price, stock, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(request.name.trim())
        .bind(request.description.unwrap_or_default())
        .bind(price)
        .bind(request.stock)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create product")?;

        Ok(product)
    }

    /// Apply a partial update. `None` if the product does not exist.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: &str, request: UpdateProduct) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                price = COALESCE(?, price),
                stock = COALESCE(?, stock),
                updated_at = datetime('now')
            WHERE id = ?
            RETURNING id, name, description, price, stock, created_at, updated_at
            "#,
        )
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.description)
        .bind(request.price)
        .bind(request.stock)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update product")?;

        Ok(product)
    }

    /// Delete a product. `false` if it did not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?;

        Ok(result.rows_affected() > 0)
    }
}
