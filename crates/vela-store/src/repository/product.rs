//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Search Is a Text Stub
//! The original system reserved room for semantic/vector search over product
//! names and descriptions. That is deliberately NOT implemented here; search
//! is a plain LIKE over name/description and is expected to stay that way in
//! this crate.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::{decimal_text, parse_decimal};
use rust_decimal::Decimal;
use vela_core::Product;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    price: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> StoreResult<Product> {
        Ok(Product {
            price: parse_decimal(&self.price, "products.price")?,
            id: self.id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, name, description, price, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(decimal_text(product.price))
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product's name, description, and price.
    ///
    /// Historical sales are unaffected: line items snapshot name/price at
    /// sale time.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        price: Decimal,
    ) -> StoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET name = ?2, description = ?3, price = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(decimal_text(price))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Searches active products by name/description substring.
    pub async fn search(&self, query: &str, limit: i64) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM products
            WHERE is_active = 1
              AND (name LIKE '%' || ?1 || '%' OR description LIKE '%' || ?1 || '%')
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Lists active products, newest first, with page math done by the caller.
    pub async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM products
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Counts active products (for pagination).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Soft-deletes a product.
    pub async fn deactivate(&self, id: &str) -> StoreResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }
}
