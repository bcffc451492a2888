//! Persistence layer for products and orders.
//!
//! Each entity gets its own narrow store contract ([`ProductStore`],
//! [`OrderStore`]) with an in-memory implementation for tests and local runs
//! and a PostgreSQL implementation backed by sqlx.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{Money, OrderId, ProductId, UserId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryOrderStore, InMemoryProductStore};
pub use postgres::{PostgresOrderStore, PostgresProductStore, run_migrations};
pub use query::Page;
pub use record::{NewOrder, NewProduct, Order, OrderChanges, OrderStatus, Product, ProductChanges};
pub use store::{OrderStore, ProductStore};
