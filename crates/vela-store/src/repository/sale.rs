//! # Sale Repository
//!
//! Database operations for sales, including the one transaction that matters:
//! sale insert + customer loyalty increment, all-or-nothing.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  insert_with_loyalty (ONE transaction)                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── INSERT INTO sales (…, items JSON, payment_methods JSON, …)      │
//! │    │                                                                    │
//! │    ├── SELECT loyalty_points FROM customers  ← read INSIDE the write   │
//! │    │                                           transaction; SQLite's   │
//! │    │                                           single-writer lock      │
//! │    │                                           rules out lost updates  │
//! │    ├── UPDATE customers SET loyalty_points = old + points,             │
//! │    │                        updated_at = now                           │
//! │  COMMIT                                                                 │
//! │    │                                                                    │
//! │    └── any failure at any step → ROLLBACK → TransactionFailed          │
//! │        (no partial sale, no partial balance - caller may retry)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Line items arrive already denormalized (name/price copied at request
//! time) and are stored verbatim in the JSON blob. Nothing here ever joins
//! back to the products table, so later product edits cannot rewrite a
//! committed sale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::repository::{decimal_text, parse_decimal};
use vela_core::{PaymentAllocation, Sale, SaleItem};

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_id: String,
    staff_id: String,
    items: String,
    subtotal: String,
    discount_amount: String,
    total_amount: String,
    loyalty_points_generated: i64,
    payment_methods: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self) -> StoreResult<Sale> {
        let items: Vec<SaleItem> = serde_json::from_str(&self.items)?;
        let payment_methods: Vec<PaymentAllocation> =
            serde_json::from_str(&self.payment_methods)?;

        Ok(Sale {
            subtotal: parse_decimal(&self.subtotal, "sales.subtotal")?,
            discount_amount: parse_decimal(&self.discount_amount, "sales.discount_amount")?,
            total_amount: parse_decimal(&self.total_amount, "sales.total_amount")?,
            id: self.id,
            customer_id: self.customer_id,
            staff_id: self.staff_id,
            items,
            loyalty_points_generated: self.loyalty_points_generated,
            payment_methods,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, customer_id, staff_id, items, subtotal, discount_amount, \
     total_amount, loyalty_points_generated, payment_methods, created_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Sale>> {
        let row: Option<SaleRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    /// Lists sales newest-first.
    pub async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM sales
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Counts all sales (for pagination).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Atomically inserts a sale and adds its loyalty points to the
    /// customer's balance.
    ///
    /// ## Returns
    /// The customer's new loyalty balance after the increment.
    ///
    /// ## Failure Semantics
    /// Any failure - constraint violation, corrupt balance, connection loss -
    /// rolls the whole transaction back and surfaces as a single
    /// [`StoreError::TransactionFailed`]. Nothing partial survives, so the
    /// caller may safely retry the whole request.
    pub async fn insert_with_loyalty(&self, sale: &Sale) -> StoreResult<Decimal> {
        match self.run_sale_transaction(sale).await {
            Ok(balance) => {
                info!(
                    sale_id = %sale.id,
                    customer_id = %sale.customer_id,
                    total = %sale.total_amount,
                    points = sale.loyalty_points_generated,
                    "Sale committed"
                );
                Ok(balance)
            }
            Err(err) => {
                debug!(sale_id = %sale.id, error = %err, "Sale transaction rolled back");
                Err(StoreError::TransactionFailed(err.to_string()))
            }
        }
    }

    /// The transactional body. Errors here roll back via the transaction's
    /// drop guard before `insert_with_loyalty` rewraps them.
    async fn run_sale_transaction(&self, sale: &Sale) -> StoreResult<Decimal> {
        let items_json = serde_json::to_string(&sale.items)?;
        let payments_json = serde_json::to_string(&sale.payment_methods)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, customer_id, staff_id, items,
                subtotal, discount_amount, total_amount,
                loyalty_points_generated, payment_methods,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_id)
        .bind(&sale.staff_id)
        .bind(&items_json)
        .bind(decimal_text(sale.subtotal))
        .bind(decimal_text(sale.discount_amount))
        .bind(decimal_text(sale.total_amount))
        .bind(sale.loyalty_points_generated)
        .bind(&payments_json)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        // Balance read happens inside the same write transaction: SQLite
        // serializes writers, so no concurrent sale can increment between
        // this read and the update below.
        let raw_balance: Option<String> =
            sqlx::query_scalar("SELECT loyalty_points FROM customers WHERE id = ?1")
                .bind(&sale.customer_id)
                .fetch_optional(&mut *tx)
                .await?;

        let balance = match raw_balance {
            Some(raw) => parse_decimal(&raw, "customers.loyalty_points")?,
            None => return Err(StoreError::not_found("Customer", &sale.customer_id)),
        };

        let new_balance = balance + Decimal::from(sale.loyalty_points_generated);
        let now = Utc::now();

        sqlx::query("UPDATE customers SET loyalty_points = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&sale.customer_id)
            .bind(decimal_text(new_balance))
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(new_balance)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{DbConfig, Store};
    use rust_decimal_macros::dec;
    use vela_core::{
        Customer, PaymentMethod, SaleItemKind, Staff,
    };

    async fn test_store() -> Store {
        Store::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(store: &Store, id: &str, points: Decimal) {
        let now = Utc::now();
        store
            .customers()
            .insert(&Customer {
                id: id.to_string(),
                phone: format!("+5255{}", &id[id.len() - 4..]),
                name: Some("Ana".to_string()),
                loyalty_points: points,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn seed_staff(store: &Store, id: &str) {
        let now = Utc::now();
        store
            .staff()
            .insert(&Staff {
                id: id.to_string(),
                name: "Luis".to_string(),
                schedule: serde_json::json!({}),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    fn sale_fixture(customer_id: &str, staff_id: &str) -> Sale {
        let now = Utc::now();
        Sale {
            id: "sale_ab12cd34ef".to_string(),
            customer_id: customer_id.to_string(),
            staff_id: staff_id.to_string(),
            items: vec![SaleItem {
                kind: SaleItemKind::Product,
                product_id: Some("product_ab12cd34ef".to_string()),
                name: "Americano".to_string(),
                description: "12oz".to_string(),
                unit_price: dec!(10.00),
                quantity: 2,
                total: dec!(20.00),
                discount_type: None,
                discount_value: None,
                applied_to_amount: None,
            }],
            subtotal: dec!(20.00),
            discount_amount: dec!(2.00),
            total_amount: dec!(18.00),
            loyalty_points_generated: 18,
            payment_methods: vec![PaymentAllocation {
                method: PaymentMethod::Cash,
                amount: dec!(18.00),
                reference: None,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_commit_accumulates_loyalty() {
        let store = test_store().await;
        seed_customer(&store, "customer_0000000001", dec!(50.00)).await;
        seed_staff(&store, "staff_0000000001").await;

        let sale = sale_fixture("customer_0000000001", "staff_0000000001");
        let balance = store.sales().insert_with_loyalty(&sale).await.unwrap();

        assert_eq!(balance, dec!(68.00));

        let customer = store
            .customers()
            .get("customer_0000000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.loyalty_points, dec!(68.00));

        let stored = store.sales().get(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.total_amount, dec!(18.00));
        assert_eq!(stored.payment_methods[0].method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_rollback_leaves_no_partial_state() {
        let store = test_store().await;
        seed_customer(&store, "customer_0000000002", dec!(50.00)).await;
        seed_staff(&store, "staff_0000000002").await;

        // Corrupt the balance so the in-transaction read fails after the
        // sale insert has already succeeded.
        sqlx::query("UPDATE customers SET loyalty_points = 'garbage' WHERE id = ?1")
            .bind("customer_0000000002")
            .execute(store.pool())
            .await
            .unwrap();

        let sale = sale_fixture("customer_0000000002", "staff_0000000002");
        let err = store.sales().insert_with_loyalty(&sale).await.unwrap_err();
        assert!(matches!(err, StoreError::TransactionFailed(_)));

        // The insert must have rolled back with the failed update.
        assert!(store.sales().get(&sale.id).await.unwrap().is_none());
        assert_eq!(store.sales().count().await.unwrap(), 0);

        let raw: String =
            sqlx::query_scalar("SELECT loyalty_points FROM customers WHERE id = ?1")
                .bind("customer_0000000002")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(raw, "garbage");
    }

    #[tokio::test]
    async fn test_unknown_customer_fails_whole_transaction() {
        let store = test_store().await;
        seed_staff(&store, "staff_0000000003").await;

        let sale = sale_fixture("customer_missing", "staff_0000000003");
        let err = store.sales().insert_with_loyalty(&sale).await.unwrap_err();
        assert!(matches!(err, StoreError::TransactionFailed(_)));
        assert_eq!(store.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_survives_product_edit() {
        let store = test_store().await;
        seed_customer(&store, "customer_0000000004", dec!(0.00)).await;
        seed_staff(&store, "staff_0000000004").await;

        let now = Utc::now();
        store
            .products()
            .insert(&vela_core::Product {
                id: "product_ab12cd34ef".to_string(),
                name: "Americano".to_string(),
                description: Some("12oz".to_string()),
                price: dec!(10.00),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let sale = sale_fixture("customer_0000000004", "staff_0000000004");
        store.sales().insert_with_loyalty(&sale).await.unwrap();

        store
            .products()
            .update("product_ab12cd34ef", "Americano Grande", None, dec!(14.00))
            .await
            .unwrap();

        let stored = store.sales().get(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].name, "Americano");
        assert_eq!(stored.items[0].unit_price, dec!(10.00));
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let store = test_store().await;
        seed_customer(&store, "customer_0000000005", dec!(0.00)).await;
        seed_staff(&store, "staff_0000000005").await;

        for n in 0..3i64 {
            let mut sale = sale_fixture("customer_0000000005", "staff_0000000005");
            sale.id = format!("sale_000000000{n}");
            sale.created_at = Utc::now() + chrono::Duration::seconds(n);
            store.sales().insert_with_loyalty(&sale).await.unwrap();
        }

        let page = store.sales().list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "sale_0000000002");
        assert_eq!(store.sales().count().await.unwrap(), 3);
    }
}
