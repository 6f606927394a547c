//! # Repository Implementations
//!
//! One repository per aggregate, each owning its SQL and the serialization
//! boundary for its JSON/decimal columns.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service layer sees:     Domain types (Customer, Sale, Decimal)        │
//! │  Repository translates:  TEXT decimals, JSON blobs, INTEGER bools      │
//! │  SQLite stores:          Plain rows                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod product;
pub mod sale;
pub mod staff;
pub mod target;
pub mod token;

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};

/// Parses a decimal TEXT column.
///
/// A non-decimal value in a decimal column means the row is corrupt; surface
/// it as a serialization error rather than a panic.
pub(crate) fn parse_decimal(raw: &str, column: &str) -> StoreResult<Decimal> {
    Decimal::from_str(raw).map_err(|_| {
        StoreError::Serialization(format!("column {column} holds non-decimal text '{raw}'"))
    })
}

/// Canonical TEXT form for a decimal column.
pub(crate) fn decimal_text(value: Decimal) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_text_round_trips() {
        let original = dec!(68.00);
        let text = decimal_text(original);
        assert_eq!(text, "68.00");
        assert_eq!(parse_decimal(&text, "loyalty_points").unwrap(), original);
    }

    #[test]
    fn corrupt_decimal_is_a_serialization_error() {
        let err = parse_decimal("not-a-number", "price").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
