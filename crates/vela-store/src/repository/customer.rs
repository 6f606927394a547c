//! # Customer Repository
//!
//! Database operations for customers.
//!
//! The loyalty balance column is special: in the sale hot path it is only
//! ever mutated by [`crate::repository::sale::SaleRepository::insert_with_loyalty`]
//! inside the sale transaction. The direct mutators here (`set_loyalty_points`)
//! exist for the operator wallet-adjustment endpoint only.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::{decimal_text, parse_decimal};
use rust_decimal::Decimal;
use vela_core::Customer;

/// Raw row shape; decimals come back as TEXT.
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: String,
    phone: String,
    name: Option<String>,
    loyalty_points: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self) -> StoreResult<Customer> {
        Ok(Customer {
            loyalty_points: parse_decimal(&self.loyalty_points, "customers.loyalty_points")?,
            id: self.id,
            phone: self.phone,
            name: self.name,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, phone, name, loyalty_points, is_active, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    /// Gets a customer by exact phone number.
    ///
    /// Used for the idempotent create-or-return-existing behavior.
    pub async fn get_by_phone(&self, phone: &str) -> StoreResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE phone = ?1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> StoreResult<()> {
        debug!(id = %customer.id, phone = %customer.phone, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, phone, name, loyalty_points, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.phone)
        .bind(&customer.name)
        .bind(decimal_text(customer.loyalty_points))
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a customer's profile fields (phone, name).
    pub async fn update_profile(
        &self,
        id: &str,
        phone: &str,
        name: Option<&str>,
    ) -> StoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET phone = ?2, name = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(phone)
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Overwrites a customer's loyalty balance (operator wallet adjustment).
    ///
    /// NOT used by the sale path - sales go through the atomic transaction
    /// in the sale repository.
    pub async fn set_loyalty_points(&self, id: &str, points: Decimal) -> StoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET loyalty_points = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(decimal_text(points))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Searches active customers by phone substring.
    pub async fn search_by_phone(&self, fragment: &str, limit: i64) -> StoreResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM customers
            WHERE phone LIKE '%' || ?1 || '%' AND is_active = 1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(fragment)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CustomerRow::into_customer).collect()
    }

    /// Lists active customers, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM customers
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CustomerRow::into_customer).collect()
    }

    /// Counts active customers (for pagination).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Soft-deletes a customer.
    pub async fn deactivate(&self, id: &str) -> StoreResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE customers SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
