//! # Domain Types
//!
//! Core domain types used throughout the Vela POS back office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Sale       │   │     Staff       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  phone (unique) │   │  customer_id    │   │  name           │       │
//! │  │  loyalty_points │   │  staff_id       │   │  schedule       │       │
//! │  └─────────────────┘   │  items[]        │   └─────────────────┘       │
//! │                        │  payments[]     │                              │
//! │  ┌─────────────────┐   └─────────────────┘   ┌─────────────────┐       │
//! │  │    Product      │                         │NotificationTarget│      │
//! │  │  ─────────────  │   ┌─────────────────┐   │  ─────────────  │       │
//! │  │  id             │   │  PaymentMethod  │   │  url            │       │
//! │  │  price          │   │  Cash, Card, …  │   │  auth (tagged)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A sale's line items carry the product name and unit price copied at sale
//! time. Editing the product afterwards never alters historical sales.
//!
//! ## Embedded Ownership
//! A sale exclusively owns its items and payment allocations. They are typed
//! sequences here; the store serializes them to JSON text columns — that
//! encode-to-text step is a persistence boundary, not a property of these
//! types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Customer
// =============================================================================

/// A customer of the point of sale.
///
/// `loyalty_points` is an accumulating exact-decimal balance, non-negative by
/// convention but not hard-enforced. In the sale hot path it is mutated only
/// inside the sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Prefixed identifier (`customer_…`).
    pub id: String,

    /// Phone number - unique business identifier.
    pub phone: String,

    /// Display name.
    pub name: Option<String>,

    /// Accumulated loyalty balance. Serialized as a string ("68.00").
    pub loyalty_points: Decimal,

    /// Whether the customer is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Staff
// =============================================================================

/// A staff member who can be referenced by sales.
///
/// Must be active at time of sale; inactive staff are treated as not-found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    /// Prefixed identifier (`staff_…`).
    pub id: String,

    pub name: String,

    /// Opaque structured schedule blob (shifts, days). The back office does
    /// not interpret it.
    #[serde(default = "default_schedule")]
    pub schedule: serde_json::Value,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_schedule() -> serde_json::Value {
    serde_json::json!({})
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Sales reference products by id but copy name/price into the line item, so
/// later edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Prefixed identifier (`product_…`).
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// Unit price. Serialized as a string.
    pub price: Decimal,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// Payment methods a sale total can be split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Transfer received before the sale.
    AdvanceTransfer,
    /// Cash received before the sale.
    AdvanceCash,
    /// Physical cash at the counter.
    Cash,
    /// Card payment.
    Card,
    /// Bank transfer at sale time.
    Transfer,
    /// Paid with accumulated loyalty points.
    LoyaltyPoints,
}

// =============================================================================
// Payment Allocation
// =============================================================================

/// One portion of a sale's total assigned to a specific payment method.
///
/// Invariant (enforced by [`crate::reconcile::reconcile_payments`] before
/// persistence): the amounts across a sale's allocations sum to the sale's
/// `total_amount` within 0.01.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub method: PaymentMethod,

    /// Amount covered by this method. Serialized as a string.
    pub amount: Decimal,

    /// External reference (transfer folio, card auth code, etc.).
    #[serde(default)]
    pub reference: Option<String>,
}

// =============================================================================
// Sale Line Items
// =============================================================================

/// Discriminant for a sale line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleItemKind {
    /// A catalog product (carries an optional product reference).
    Product,
    /// An ad-hoc charge not in the catalog.
    Other,
    /// A discount line (negative contribution, extra discount fields).
    Discount,
}

/// How a discount line was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// One priced entry within a sale.
///
/// ## Tagged Union, Flat Shape
/// The wire format is a flat object with a `type` discriminant and
/// discount-only fields that must be present iff `type == "discount"`
/// (checked by [`crate::validation::validate_sale_items`]). We mirror that
/// shape instead of a Rust enum so stored sales deserialize byte-for-byte.
///
/// ## Snapshot Semantics
/// `name`, `description` and `unit_price` are copies taken at sale time,
/// not live product references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Item discriminant: product, other, or discount.
    #[serde(rename = "type")]
    pub kind: SaleItemKind,

    /// Product reference, when the item came from the catalog.
    #[serde(default)]
    pub product_id: Option<String>,

    /// Name at time of sale (frozen).
    pub name: String,

    /// Description at time of sale (frozen).
    pub description: String,

    /// Unit price at time of sale (frozen). Serialized as a string.
    pub unit_price: Decimal,

    /// Quantity sold.
    pub quantity: i64,

    /// Line total (negative for discount lines).
    pub total: Decimal,

    /// Discount-only: percentage or fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,

    /// Discount-only: the percentage or fixed value applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<Decimal>,

    /// Discount-only: the amount the discount was applied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_to_amount: Option<Decimal>,
}

impl SaleItem {
    /// True when all three discount-only fields are present.
    pub fn has_discount_fields(&self) -> bool {
        self.discount_type.is_some()
            && self.discount_value.is_some()
            && self.applied_to_amount.is_some()
    }

    /// True when none of the discount-only fields are present.
    pub fn has_no_discount_fields(&self) -> bool {
        self.discount_type.is_none()
            && self.discount_value.is_none()
            && self.applied_to_amount.is_none()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Once committed a sale is immutable: there is no update or delete
/// operation. `total_amount = subtotal - discount_amount` is expected but
/// caller-supplied and not re-derived (preserved trusting behavior).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Prefixed identifier (`sale_…`).
    pub id: String,

    pub customer_id: String,
    pub staff_id: String,

    /// Ordered line items. Order preserved for display, not load-bearing.
    pub items: Vec<SaleItem>,

    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,

    /// Points granted to the customer by this sale. Caller-supplied integer,
    /// added to the decimal balance on commit.
    pub loyalty_points_generated: i64,

    /// Ordered payment allocations covering `total_amount`.
    pub payment_methods: Vec<PaymentAllocation>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Notification Targets
// =============================================================================

/// Which registry a notification target lives in.
///
/// Webhooks and signals are two independent sets with identical dispatch
/// semantics; the kind only selects the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Webhook,
    Signal,
}

impl TargetKind {
    /// Human-readable label for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::Webhook => "Webhook",
            TargetKind::Signal => "Signal",
        }
    }
}

/// Authentication configuration for a notification target.
///
/// Stored as a JSON blob; the tagged representation matches the original
/// wire format: `{"type": "bearer", "token": "…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetAuth {
    /// No authentication.
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer { token: String },
    /// Caller-specified header name set to the token.
    Apikey { header: String, token: String },
    /// `Authorization: Basic base64(user:pass)`
    Basic { username: String, password: String },
}

/// An external endpoint registered to receive sale events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTarget {
    /// Prefixed identifier (`webhook_…` / `signal_…`).
    pub id: String,

    pub kind: TargetKind,

    /// Display name for operators and logs.
    pub name: String,

    /// Destination URL for the POST.
    pub url: String,

    /// Only active targets are loaded at dispatch time.
    pub is_active: bool,

    pub auth: TargetAuth,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product_item() -> SaleItem {
        SaleItem {
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
        }
    }

    #[test]
    fn item_serializes_with_type_discriminant() {
        let json = serde_json::to_value(product_item()).unwrap();
        assert_eq!(json["type"], "product");
        // Decimals go out as strings, never floats
        assert_eq!(json["unit_price"], "10.00");
        // Discount-only fields are omitted entirely for non-discount items
        assert!(json.get("discount_type").is_none());
    }

    #[test]
    fn discount_item_round_trips() {
        let raw = serde_json::json!({
            "type": "discount",
            "name": "Promo",
            "description": "10% off",
            "unit_price": "-2.00",
            "quantity": 1,
            "total": "-2.00",
            "discount_type": "percentage",
            "discount_value": "10",
            "applied_to_amount": "20.00"
        });
        let item: SaleItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.kind, SaleItemKind::Discount);
        assert!(item.has_discount_fields());
        assert_eq!(item.discount_type, Some(DiscountType::Percentage));
    }

    #[test]
    fn payment_method_wire_names_are_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::AdvanceTransfer).unwrap();
        assert_eq!(json, "\"advance_transfer\"");
        let json = serde_json::to_string(&PaymentMethod::LoyaltyPoints).unwrap();
        assert_eq!(json, "\"loyalty_points\"");
    }

    #[test]
    fn target_auth_tagged_representation() {
        let auth: TargetAuth =
            serde_json::from_str(r#"{"type": "bearer", "token": "secret"}"#).unwrap();
        assert_eq!(
            auth,
            TargetAuth::Bearer {
                token: "secret".to_string()
            }
        );

        let none: TargetAuth = serde_json::from_str(r#"{"type": "none"}"#).unwrap();
        assert_eq!(none, TargetAuth::None);
    }
}
