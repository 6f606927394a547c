//! # Validation Module
//!
//! Input validation for the Vela POS back office.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (caller-provided)                                  │
//! │  ├── Schema/shape validation (deserialization)                         │
//! │  └── Out of scope for this workspace                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service (vela-backoffice)                                    │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (customer phone)                               │
//! │  └── Foreign key constraints (sale → customer/staff)                   │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{SaleItem, SaleItemKind};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
///
/// Format is deliberately loose: the original system stores whatever the
/// operator typed and searches by substring.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 32,
        });
    }

    Ok(())
}

/// Validates a display name (customer, staff, product, target).
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a notification target URL.
///
/// ## Rules
/// - Must not be empty
/// - Must start with `http://` or `https://`
pub fn validate_target_url(url: &str) -> ValidationResult<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Required {
            field: "url".to_string(),
        });
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidFormat {
            field: "url".to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Sale Item Validators
// =============================================================================

/// Validates a sale's line items.
///
/// ## Rules
/// - At least one item, at most [`MAX_SALE_ITEMS`]
/// - Every quantity positive and at most [`MAX_ITEM_QUANTITY`]
/// - Discount-only fields (`discount_type`, `discount_value`,
///   `applied_to_amount`) present **iff** the item kind is `discount`
///
/// ## What Is Deliberately NOT Checked
/// - Line totals summing to the subtotal
/// - `total_amount == subtotal − discount_amount`
///
/// The caller is trusted on amounts; the only monetary invariant enforced
/// before persistence is payment reconciliation.
pub fn validate_sale_items(items: &[SaleItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for item in items {
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity ({})", item.name),
            });
        }

        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: format!("quantity ({})", item.name),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let fields_ok = match item.kind {
            SaleItemKind::Discount => item.has_discount_fields(),
            SaleItemKind::Product | SaleItemKind::Other => item.has_no_discount_fields(),
        };

        if !fields_ok {
            return Err(ValidationError::DiscountFieldMismatch {
                item_name: item.name.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscountType;
    use rust_decimal_macros::dec;

    fn item(kind: SaleItemKind) -> SaleItem {
        SaleItem {
            kind,
            product_id: None,
            name: "Test".to_string(),
            description: String::new(),
            unit_price: dec!(10.00),
            quantity: 1,
            total: dec!(10.00),
            discount_type: None,
            discount_value: None,
            applied_to_amount: None,
        }
    }

    fn discount_item() -> SaleItem {
        SaleItem {
            kind: SaleItemKind::Discount,
            discount_type: Some(DiscountType::Fixed),
            discount_value: Some(dec!(2.00)),
            applied_to_amount: Some(dec!(20.00)),
            unit_price: dec!(-2.00),
            total: dec!(-2.00),
            ..item(SaleItemKind::Discount)
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("5551234567").is_ok());
        assert!(validate_phone("+52 555 123 4567").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("   ").is_err());
        assert!(validate_phone(&"9".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ana Martinez").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_target_url() {
        assert!(validate_target_url("https://hooks.example.com/sales").is_ok());
        assert!(validate_target_url("http://10.0.0.1/notify").is_ok());
        assert!(validate_target_url("").is_err());
        assert!(validate_target_url("ftp://example.com").is_err());
    }

    #[test]
    fn items_must_be_non_empty() {
        assert!(validate_sale_items(&[]).is_err());
        assert!(validate_sale_items(&[item(SaleItemKind::Product)]).is_ok());
    }

    #[test]
    fn quantity_must_be_positive() {
        let mut bad = item(SaleItemKind::Other);
        bad.quantity = 0;
        assert!(validate_sale_items(&[bad]).is_err());
    }

    #[test]
    fn discount_fields_required_on_discount_items() {
        let mut missing = item(SaleItemKind::Discount);
        missing.discount_type = None;
        assert!(matches!(
            validate_sale_items(&[missing]).unwrap_err(),
            ValidationError::DiscountFieldMismatch { .. }
        ));

        assert!(validate_sale_items(&[discount_item()]).is_ok());
    }

    #[test]
    fn discount_fields_forbidden_on_product_items() {
        let mut sneaky = item(SaleItemKind::Product);
        sneaky.discount_type = Some(DiscountType::Percentage);
        sneaky.discount_value = Some(dec!(10));
        sneaky.applied_to_amount = Some(dec!(20.00));
        assert!(matches!(
            validate_sale_items(&[sneaky]).unwrap_err(),
            ValidationError::DiscountFieldMismatch { .. }
        ));
    }

    #[test]
    fn mixed_product_and_discount_items_pass() {
        let items = vec![item(SaleItemKind::Product), discount_item()];
        assert!(validate_sale_items(&items).is_ok());
    }
}
