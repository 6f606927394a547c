//! # vela-backoffice: Service Layer for Vela POS
//!
//! The API surface of the back office. This crate owns the sale write path,
//! notification delivery, the caller auth contract, and the CRUD plumbing
//! around them. It deliberately ships no HTTP server - callers wire these
//! services to whatever transport they want.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     vela-backoffice (THIS CRATE)                        │
//! │                                                                         │
//! │  ┌──────────────────┐      ┌─────────────────────────────────────────┐ │
//! │  │ SaleOrchestrator │      │        NotificationDispatcher           │ │
//! │  │                  │      │                                         │ │
//! │  │  auth → exists → │commit│  load targets → 1 payload → N POSTs    │ │
//! │  │  validate →      ├─────►│  (fire-and-forget, post-commit only)   │ │
//! │  │  atomic write    │spawn │                                         │ │
//! │  └────────┬─────────┘      └────────────────────┬────────────────────┘ │
//! │           │                                     │                      │
//! │  ┌────────┴─────────────────────────┐           │ reqwest              │
//! │  │ CustomerService  ProductService  │           ▼                      │
//! │  │ StaffService     TargetService   │    external endpoints            │
//! │  └────────┬─────────────────────────┘                                  │
//! │           │                                                            │
//! │           ▼                                                            │
//! │      vela-store (SQLite)        vela-core (pure rules)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`orchestrator`] - The sale write path (preconditions, atomic commit,
//!   post-commit dispatch)
//! - [`dispatcher`] - Fire-and-forget webhook/signal delivery + test probe
//! - [`auth`] - Bearer-token pass/fail contract and role gate
//! - [`services`] - Customer/product/staff/target CRUD
//! - [`dto`] - Request/response projections (decimals as strings)
//! - [`error`] - The 400/401/403/404/500 error taxonomy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod orchestrator;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{authenticate, require_admin_or_agent, AuthContext, CallerRole};
pub use dispatcher::{DispatchConfig, NotificationDispatcher, TargetTestOutcome};
pub use dto::{CreateSaleRequest, CustomerSummary, Page, SaleReceipt, StaffSummary};
pub use error::{ServiceError, ServiceResult};
pub use orchestrator::SaleOrchestrator;
pub use services::{CustomerService, ProductService, StaffService, TargetService};
