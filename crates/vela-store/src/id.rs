//! # Identifier Generation
//!
//! Prefixed random identifiers for all entities.
//!
//! ## Format
//! `<prefix>_<10 hex chars>`, e.g. `sale_3fa85f6457`, `customer_9b2c1e0d44`.
//!
//! The prefix makes ids self-describing in logs and webhook payloads; the
//! random part comes from UUIDv4 material, so ids are generated without
//! coordination.

use uuid::Uuid;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 10;

/// Generates a new prefixed identifier.
///
/// ## Example
/// ```rust
/// use vela_store::id::generate_id;
///
/// let id = generate_id("sale");
/// assert!(id.starts_with("sale_"));
/// assert_eq!(id.len(), "sale_".len() + 10);
/// ```
pub fn generate_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &raw[..SUFFIX_LEN])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_prefix() {
        let id = generate_id("customer");
        assert!(id.starts_with("customer_"));
        assert_eq!(id.len(), "customer_".len() + SUFFIX_LEN);
    }

    #[test]
    fn ids_are_unique_enough() {
        let a = generate_id("sale");
        let b = generate_id("sale");
        assert_ne!(a, b);
    }
}
