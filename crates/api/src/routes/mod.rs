//! HTTP route handlers and the state they share.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use domain::{OrderService, ProductService};
use store::{OrderStore, ProductStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<P: ProductStore, O: OrderStore> {
    pub order_service: OrderService<P, O>,
    pub product_service: ProductService<P>,
}

impl<P: ProductStore + Clone, O: OrderStore> AppState<P, O> {
    /// Wires both services over the same product store.
    pub fn new(products: P, orders: O) -> Self {
        Self {
            product_service: ProductService::new(products.clone()),
            order_service: OrderService::new(products, orders),
        }
    }
}

/// Parses a path id, which must be a positive integer.
pub(crate) fn parse_id(raw: &str, name: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(format!(
            "{name} must be a positive integer"
        ))),
    }
}

/// Unwraps a JSON body, reporting malformed input as a validation error.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unwraps query parameters, reporting malformed input as a validation error.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
