//! # vela-store: Database Layer for Vela POS
//!
//! This crate provides database access for the Vela POS back office.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Data Flow                               │
//! │                                                                         │
//! │  Service call (create_sale, search_customers)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vela-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (customer.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │ TargetRepo …  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                        SQLite Database                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`id`] - Prefixed identifier generation
//! - [`repository`] - Repository implementations (customer, sale, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vela_store::{Store, DbConfig};
//!
//! // Create store with default config
//! let store = Store::new(DbConfig::new("path/to/vela.db")).await?;
//!
//! // Use repositories
//! let customer = store.customers().get("customer_ab12cd34ef").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod id;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use id::generate_id;
pub use pool::{DbConfig, Store};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::staff::StaffRepository;
pub use repository::target::TargetRepository;
pub use repository::token::{TokenRecord, TokenRepository};
