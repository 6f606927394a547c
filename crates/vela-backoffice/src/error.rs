//! # Service Error Types
//!
//! What callers of the back office see. Each variant maps onto the status
//! contract a transport would use:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ServiceError → Status Contract                      │
//! │                                                                         │
//! │  Validation        → 400   caller sent a bad request                   │
//! │  Unauthorized      → 401   no/invalid/expired token                    │
//! │  Forbidden         → 403   valid token, insufficient role              │
//! │  NotFound          → 404   referenced entity missing (or inactive      │
//! │                            staff - deliberately indistinguishable)     │
//! │  TransactionFailed → 500   atomic write rolled back; safe to retry     │
//! │  Internal          → 500   everything else                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vela_core::ValidationError;
use vela_store::StoreError;

/// Errors surfaced by back-office services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input failed business-rule validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist (or, for staff, is inactive).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Missing, malformed, expired, or unknown credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role is not allowed to perform the operation.
    #[error("Forbidden: requires admin or agent role")]
    Forbidden,

    /// The atomic sale + loyalty write rolled back. Nothing partial was
    /// committed; the whole request may be retried.
    #[error("Sale transaction failed: {0}")]
    TransactionFailed(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Store errors cross the boundary with their category preserved: missing
/// rows stay not-found, rolled-back transactions stay retryable, and
/// everything else is an internal fault the caller can't act on.
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            StoreError::TransactionFailed(msg) => ServiceError::TransactionFailed(msg),
            StoreError::UniqueViolation { field } => {
                ServiceError::Validation(ValidationError::InvalidFormat {
                    field,
                    reason: "already exists".to_string(),
                })
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_service_not_found() {
        let err: ServiceError = StoreError::not_found("Customer", "customer_x").into();
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert_eq!(err.to_string(), "Customer not found: customer_x");
    }

    #[test]
    fn test_transaction_failure_stays_retryable() {
        let err: ServiceError = StoreError::TransactionFailed("rollback".to_string()).into();
        assert!(matches!(err, ServiceError::TransactionFailed(_)));
    }

    #[test]
    fn test_unique_violation_is_a_validation_error() {
        let err: ServiceError = StoreError::UniqueViolation {
            field: "customers.phone".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
