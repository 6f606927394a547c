//! # Money Module
//!
//! Exact decimal handling for monetary values.
//!
//! ## Why Decimals, Not Floats?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A loyalty balance that drifts by fractions of a cent across           │
//! │  thousands of sales is a support ticket factory.                      │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                   │
//! │    Fixed-point, exact addition, exact comparison, and serde            │
//! │    serializes it as a STRING ("18.00") so JSON round trips             │
//! │    never touch a float either.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vela_core::money::{parse_amount, Decimal, PAYMENT_TOLERANCE};
//!
//! let total = parse_amount("18.00").unwrap();
//! let paid = parse_amount("17.99").unwrap();
//! assert!((total - paid).abs() <= PAYMENT_TOLERANCE);
//! ```

use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::error::ValidationError;

/// Re-exported so downstream crates name one decimal type.
pub use rust_decimal::Decimal;

// =============================================================================
// Constants
// =============================================================================

/// Absolute tolerance when comparing a payment sum against a sale total.
///
/// ## Why 0.01?
/// One minor currency unit. Split-tender rounding (e.g. a 1/3 split of a
/// cash total) can legitimately land one cent off; anything beyond that is
/// a caller bug and must be rejected.
pub const PAYMENT_TOLERANCE: Decimal = dec!(0.01);

/// Zero, for default balances.
pub const ZERO: Decimal = Decimal::ZERO;

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal amount from its canonical string form.
///
/// ## Example
/// ```rust
/// use vela_core::money::parse_amount;
///
/// assert!(parse_amount("18.00").is_ok());
/// assert!(parse_amount("-2.00").is_ok());
/// assert!(parse_amount("eighteen").is_err());
/// ```
pub fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str(raw.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: format!("'{raw}' is not a decimal amount"),
    })
}

/// Formats an amount with exactly two decimal places.
///
/// Storage and wire formats keep whatever scale the caller sent; this is
/// for display surfaces (receipts, logs) that want "18.00", not "18".
pub fn format_amount(amount: Decimal) -> String {
    let mut fixed = amount.round_dp(2);
    fixed.rescale(2);
    fixed.to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_amounts() {
        assert_eq!(parse_amount("18.00").unwrap(), dec!(18.00));
        assert_eq!(parse_amount(" 0.50 ").unwrap(), dec!(0.50));
        assert_eq!(parse_amount("-2.00").unwrap(), dec!(-2.00));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("18,00").is_err());
        assert!(parse_amount("NaN-ish").is_err());
    }

    #[test]
    fn tolerance_is_one_cent() {
        assert_eq!(PAYMENT_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn exact_addition_does_not_drift() {
        // The classic float failure: 0.1 + 0.2
        let sum = dec!(0.1) + dec!(0.2);
        assert_eq!(sum, dec!(0.3));
    }

    #[test]
    fn format_pads_to_two_places() {
        assert_eq!(format_amount(dec!(18)), "18.00");
        assert_eq!(format_amount(dec!(18.5)), "18.50");
    }
}
