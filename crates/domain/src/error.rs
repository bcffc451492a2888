//! Domain error types.

use common::{OrderId, ProductId};
use store::StoreError;
use thiserror::Error;

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Product,
    Order,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Product => f.write_str("Product"),
            Entity::Order => f.write_str("Order"),
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The referenced product or order does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: Entity, id: i64 },

    /// A business rule rejected the request.
    #[error("{0}")]
    Validation(String),

    /// Stored data is inconsistent, e.g. an order referencing a product that
    /// no longer exists while it is being revised.
    #[error("{0}")]
    Internal(String),

    /// An error occurred in the underlying store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn product_not_found(id: ProductId) -> Self {
        DomainError::NotFound {
            entity: Entity::Product,
            id: id.as_i64(),
        }
    }

    pub fn order_not_found(id: OrderId) -> Self {
        DomainError::NotFound {
            entity: Entity::Order,
            id: id.as_i64(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        DomainError::Validation(reason.into())
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound {
                entity: Entity::Product,
                ..
            } => "PRODUCT_NOT_FOUND",
            DomainError::NotFound {
                entity: Entity::Order,
                ..
            } => "ORDER_NOT_FOUND",
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::Internal(_) | DomainError::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}
