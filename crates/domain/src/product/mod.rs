//! Product catalogue.

mod service;

pub use service::ProductService;
pub use store::{NewProduct, Product, ProductChanges};
