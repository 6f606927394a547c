//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vela-store errors (separate crate)                                    │
//! │  └── StoreError       - Database operation failures                    │
//! │                                                                         │
//! │  vela-backoffice errors (separate crate)                               │
//! │  └── ServiceError     - What callers see (400/404/500 taxonomy)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ServiceError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced entity cannot be found.
    ///
    /// ## When This Occurs
    /// - Customer/staff id doesn't exist
    /// - Staff exists but is inactive (deliberately folded into not-found)
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early rejection before any write happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., not a decimal, bad discriminant).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Discount-only fields present or absent on the wrong item kind.
    ///
    /// ## When This Occurs
    /// - `discount_type`/`discount_value`/`applied_to_amount` on a
    ///   product/other item
    /// - A discount item missing any of the three
    #[error("discount fields must be present exactly when item type is 'discount' (item: {item_name})")]
    DiscountFieldMismatch { item_name: String },

    /// Payment allocations don't reconcile against the sale total.
    ///
    /// ## The Invariant
    /// `|sum(allocations) - total_amount| <= 0.01`
    #[error("payment allocation mismatch: allocations sum to {allocated}, total is {total}")]
    PaymentMismatch { allocated: Decimal, total: Decimal },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotFound {
            entity: "Customer",
            id: "customer_ab12cd34ef".to_string(),
        };
        assert_eq!(err.to_string(), "Customer not found: customer_ab12cd34ef");
    }

    #[test]
    fn test_payment_mismatch_message() {
        let err = ValidationError::PaymentMismatch {
            allocated: dec!(17.50),
            total: dec!(18.00),
        };
        assert_eq!(
            err.to_string(),
            "payment allocation mismatch: allocations sum to 17.50, total is 18.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
