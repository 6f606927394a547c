//! # Sale Transaction Orchestrator
//!
//! The single write path for sales. Every precondition runs in a fixed
//! order before anything touches the database, the write itself is one
//! atomic transaction, and notification dispatch starts strictly after
//! commit.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          create_sale                                    │
//! │                                                                         │
//! │  1. require_admin_or_agent          ──► Forbidden                       │
//! │  2. customer exists                 ──► NotFound("Customer")            │
//! │  3. staff exists AND is active      ──► NotFound("Staff")               │
//! │  4. item validation + reconciliation──► Validation                      │
//! │        (first failure wins; no side effects so far)                    │
//! │  5. build Sale (fresh id, UTC now, caller-trusted amounts)             │
//! │  6. insert_with_loyalty             ──► TransactionFailed (retryable)   │
//! │        ════════ COMMIT ════════                                         │
//! │  7. tokio::spawn(dispatch)   detached, never awaited, can't fail       │
//! │        the request                                                      │
//! │  8. SaleReceipt                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No idempotency key exists: two identical requests create two sales.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::auth::{require_admin_or_agent, AuthContext};
use crate::dispatcher::NotificationDispatcher;
use crate::dto::{page_bounds, CreateSaleRequest, CustomerSummary, Page, SaleReceipt, StaffSummary};
use crate::error::{ServiceError, ServiceResult};
use vela_core::{reconcile_payments, validation::validate_sale_items, Sale};
use vela_store::{generate_id, Store};

/// Orchestrates sale creation and sale reads.
#[derive(Debug, Clone)]
pub struct SaleOrchestrator {
    store: Store,
    dispatcher: Arc<NotificationDispatcher>,
}

impl SaleOrchestrator {
    /// Creates a new orchestrator over a store and dispatcher.
    pub fn new(store: Store, dispatcher: Arc<NotificationDispatcher>) -> Self {
        SaleOrchestrator { store, dispatcher }
    }

    /// Creates a sale: the atomic insert + loyalty increment, then detached
    /// notification dispatch, then the receipt.
    pub async fn create_sale(
        &self,
        ctx: &AuthContext,
        request: CreateSaleRequest,
    ) -> ServiceResult<SaleReceipt> {
        require_admin_or_agent(ctx)?;

        // Preconditions in fixed order; the first failure wins and nothing
        // has been written yet.
        let customer = self
            .store
            .customers()
            .get(&request.customer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", &request.customer_id))?;

        // Inactive staff is deliberately indistinguishable from missing.
        let staff = self
            .store
            .staff()
            .get(&request.staff_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| ServiceError::not_found("Staff", &request.staff_id))?;

        validate_sale_items(&request.items)?;
        reconcile_payments(request.total_amount, &request.payment_methods)?;

        let now = Utc::now();
        let sale = Sale {
            id: generate_id("sale"),
            customer_id: request.customer_id,
            staff_id: request.staff_id,
            items: request.items,
            subtotal: request.subtotal,
            discount_amount: request.discount_amount,
            total_amount: request.total_amount,
            loyalty_points_generated: request.loyalty_points_generated,
            payment_methods: request.payment_methods,
            created_at: now,
            updated_at: now,
        };

        // All-or-nothing. On failure nothing was committed and the whole
        // request may be retried.
        let new_balance = self.store.sales().insert_with_loyalty(&sale).await?;

        let customer_summary = CustomerSummary {
            id: customer.id,
            phone: customer.phone,
            name: customer.name,
            loyalty_points: new_balance,
        };
        let staff_summary = StaffSummary {
            id: staff.id,
            name: staff.name,
        };

        info!(
            sale_id = %sale.id,
            customer_id = %customer_summary.id,
            new_balance = %new_balance,
            "Sale created"
        );

        // Strictly after commit: detached fire-and-forget dispatch with the
        // committed snapshots. Never awaited, cannot fail the request.
        {
            let dispatcher = self.dispatcher.clone();
            let sale = sale.clone();
            let customer = customer_summary.clone();
            let staff = staff_summary.clone();
            tokio::spawn(async move {
                dispatcher.dispatch_sale(sale, customer, staff).await;
            });
        }

        Ok(SaleReceipt::assemble(&sale, customer_summary, staff_summary))
    }

    /// Fetches one sale as a receipt with current customer/staff summaries.
    pub async fn get_sale(&self, ctx: &AuthContext, id: &str) -> ServiceResult<SaleReceipt> {
        require_admin_or_agent(ctx)?;

        let sale = self
            .store
            .sales()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Sale", id))?;

        self.project(sale).await
    }

    /// Lists sales newest-first, one page at a time.
    pub async fn list_sales(
        &self,
        ctx: &AuthContext,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<Page<SaleReceipt>> {
        require_admin_or_agent(ctx)?;

        let (page, page_size) = page_bounds(page, page_size);
        let offset = (page - 1) * page_size;

        let sales = self.store.sales().list(page_size, offset).await?;
        let total = self.store.sales().count().await?;

        let mut items = Vec::with_capacity(sales.len());
        for sale in sales {
            items.push(self.project(sale).await?);
        }

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Builds a receipt projection for a stored sale. Summaries reflect the
    /// current customer/staff rows (balance as of now, not as of the sale).
    async fn project(&self, sale: Sale) -> ServiceResult<SaleReceipt> {
        let customer = self
            .store
            .customers()
            .get(&sale.customer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", &sale.customer_id))?;
        let staff = self
            .store
            .staff()
            .get(&sale.staff_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Staff", &sale.staff_id))?;

        Ok(SaleReceipt::assemble(
            &sale,
            CustomerSummary {
                id: customer.id,
                phone: customer.phone,
                name: customer.name,
                loyalty_points: customer.loyalty_points,
            },
            StaffSummary {
                id: staff.id,
                name: staff.name,
            },
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
