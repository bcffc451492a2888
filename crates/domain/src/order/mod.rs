//! Order lifecycle engine.

mod service;

pub use service::OrderService;
pub use store::{Order, OrderStatus};
