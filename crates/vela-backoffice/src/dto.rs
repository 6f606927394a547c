//! # Request / Response Projections
//!
//! Wire-shaped types for the service layer. Decimals serialize as strings
//! (rust_decimal's serde default), timestamps as RFC 3339 - matching the
//! notification payload so a sale looks the same everywhere it travels.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vela_core::{PaymentAllocation, Sale, SaleItem};

// =============================================================================
// Sale Creation
// =============================================================================

/// Request to create a sale.
///
/// Amounts are caller-supplied and trusted (`total_amount` is NOT re-derived
/// from `subtotal - discount_amount`); line items arrive already denormalized
/// with name/price copied by the caller at request time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_id: String,
    pub staff_id: String,
    pub items: Vec<SaleItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub loyalty_points_generated: i64,
    pub payment_methods: Vec<PaymentAllocation>,
}

/// Customer projection embedded in receipts and notification payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    /// Balance *after* the sale's points were applied.
    pub loyalty_points: Decimal,
}

/// Staff projection embedded in receipts and notification payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffSummary {
    pub id: String,
    pub name: String,
}

/// The response to a successful sale creation: the committed sale plus the
/// customer and staff snapshots the notification payload was built from.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub customer: CustomerSummary,
    pub staff: StaffSummary,
    pub items: Vec<SaleItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub loyalty_points_generated: i64,
    pub payment_methods: Vec<PaymentAllocation>,
    pub created_at: DateTime<Utc>,
}

impl SaleReceipt {
    /// Assembles a receipt from the committed sale and its companions.
    pub fn assemble(sale: &Sale, customer: CustomerSummary, staff: StaffSummary) -> Self {
        SaleReceipt {
            sale_id: sale.id.clone(),
            customer,
            staff,
            items: sale.items.clone(),
            subtotal: sale.subtotal,
            discount_amount: sale.discount_amount,
            total_amount: sale.total_amount,
            loyalty_points_generated: sale.loyalty_points_generated,
            payment_methods: sale.payment_methods.clone(),
            created_at: sale.created_at,
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a listing, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total rows across all pages.
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Clamps caller-supplied page math to sane bounds.
///
/// Page numbers are 1-based; page size is capped at 100.
pub fn page_bounds(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    (page, page_size)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_page_bounds_clamp() {
        assert_eq!(page_bounds(0, 20), (1, 20));
        assert_eq!(page_bounds(-5, 0), (1, 1));
        assert_eq!(page_bounds(3, 500), (3, 100));
    }

    #[test]
    fn test_receipt_serializes_decimals_as_strings() {
        let receipt = SaleReceipt {
            sale_id: "sale_ab12cd34ef".to_string(),
            customer: CustomerSummary {
                id: "customer_ab12cd34ef".to_string(),
                phone: "5551234567".to_string(),
                name: Some("Ana".to_string()),
                loyalty_points: dec!(68.00),
            },
            staff: StaffSummary {
                id: "staff_ab12cd34ef".to_string(),
                name: "Luis".to_string(),
            },
            items: vec![],
            subtotal: dec!(20.00),
            discount_amount: dec!(2.00),
            total_amount: dec!(18.00),
            loyalty_points_generated: 18,
            payment_methods: vec![],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["total_amount"], "18.00");
        assert_eq!(json["customer"]["loyalty_points"], "68.00");
        assert_eq!(json["loyalty_points_generated"], 18);
    }
}
