//! # CRUD Services
//!
//! The plumbing around the sale path: customer, staff, product, and
//! notification-target management. Every operation checks the caller role
//! first and returns the same error taxonomy as the orchestrator.

pub mod customer;
pub mod product;
pub mod staff;
pub mod target;

pub use customer::CustomerService;
pub use product::ProductService;
pub use staff::StaffService;
pub use target::TargetService;
