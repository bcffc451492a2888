//! Domain layer for the storefront backend.
//!
//! This crate provides:
//! - [`OrderService`], the order lifecycle engine that keeps product stock
//!   consistent with order creation, revision and deletion
//! - [`ProductService`] for catalogue management
//! - [`DomainError`], the error taxonomy surfaced to callers

pub mod error;
pub mod order;
pub mod product;

pub use error::{DomainError, Entity};
pub use order::OrderService;
pub use product::ProductService;
