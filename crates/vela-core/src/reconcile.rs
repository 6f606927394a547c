//! # Payment Reconciliation
//!
//! The check that a sale's payment allocations actually cover its total.
//!
//! ## The Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PAYMENT RECONCILIATION                                                 │
//! │                                                                         │
//! │  total_amount: 18.00                                                    │
//! │                                                                         │
//! │  allocations:  cash      10.00                                          │
//! │                card       8.00                                          │
//! │                ─────────────────                                        │
//! │                sum       18.00   |18.00 − 18.00| = 0.00 ≤ 0.01  ✓      │
//! │                                                                         │
//! │  allocations:  cash      17.50   |17.50 − 18.00| = 0.50 > 0.01  ✗      │
//! │                                                                         │
//! │  Exact decimal arithmetic throughout - a float sum would make the      │
//! │  tolerance check itself unreliable.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Where It Runs
//! Twice, deliberately:
//! 1. At the request-validation boundary, for fast rejection before any
//!    entity lookup cost.
//! 2. It is safe to re-invoke inside the sale transaction - pure, no side
//!    effects, idempotent.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::PAYMENT_TOLERANCE;
use crate::types::PaymentAllocation;

/// Verifies that payment allocations sum to the sale total within tolerance.
///
/// ## Contract
/// Succeeds iff `|sum(allocations) − total| <= 0.01`. Pure and
/// deterministic; the only output is `Ok(())` or
/// [`ValidationError::PaymentMismatch`].
///
/// ## Example
/// ```rust
/// use rust_decimal_macros::dec;
/// use vela_core::reconcile::reconcile_payments;
/// use vela_core::types::{PaymentAllocation, PaymentMethod};
///
/// let cash = PaymentAllocation {
///     method: PaymentMethod::Cash,
///     amount: dec!(17.99),
///     reference: None,
/// };
/// // One cent short is still within tolerance
/// assert!(reconcile_payments(dec!(18.00), &[cash]).is_ok());
/// ```
pub fn reconcile_payments(
    total: Decimal,
    allocations: &[PaymentAllocation],
) -> Result<(), ValidationError> {
    let allocated: Decimal = allocations.iter().map(|pm| pm.amount).sum();

    if (allocated - total).abs() <= PAYMENT_TOLERANCE {
        Ok(())
    } else {
        Err(ValidationError::PaymentMismatch { allocated, total })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
