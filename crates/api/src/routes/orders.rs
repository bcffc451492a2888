//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use store::{Order, OrderStatus, OrderStore, ProductStore};

use super::{AppState, json_body, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn validate_quantity(quantity: i64) -> Result<u32, ApiError> {
    match u32::try_from(quantity) {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(ApiError::BadRequest(
            "quantity must be a positive integer".to_string(),
        )),
    }
}

fn validate_positive(value: i64, field: &str) -> Result<i64, ApiError> {
    if value <= 0 {
        return Err(ApiError::BadRequest(format!(
            "{field} must be a positive integer"
        )));
    }
    Ok(value)
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub total_amount_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_i64(),
            user_id: order.user_id.as_i64(),
            product_id: order.product_id.as_i64(),
            quantity: order.quantity,
            total_amount_cents: order.total_amount.cents(),
            status: order.status.into(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// -- Handlers --

/// POST /orders: place an order and take its units out of stock.
#[tracing::instrument(skip(state, body))]
pub async fn create<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let req = json_body(body)?;
    let user_id = UserId::new(validate_positive(req.user_id, "user_id")?);
    let product_id = ProductId::new(validate_positive(req.product_id, "product_id")?);
    let quantity = validate_quantity(req.quantity)?;

    let order = state
        .order_service
        .create_order(user_id, product_id, quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{id}: every order of the user with that id.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let user_id = UserId::new(parse_id(&id, "user id")?);
    let orders = state.order_service.get_orders_by_user_id(user_id).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /orders/details/{id}
#[tracing::instrument(skip(state))]
pub async fn get<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order_id = OrderId::new(parse_id(&id, "order id")?);
    let order = state.order_service.get_order_by_id(order_id).await?;
    Ok(Json(order.into()))
}

/// PUT /orders/status/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update_status<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order_id = OrderId::new(parse_id(&id, "order id")?);
    let req = json_body(body)?;
    let status = req.status.trim();
    if status.is_empty() {
        return Err(ApiError::BadRequest("status must not be empty".to_string()));
    }

    let order = state
        .order_service
        .update_order_status(order_id, OrderStatus::from(status))
        .await?;
    Ok(Json(order.into()))
}

/// PUT /orders/{id}: change the quantity of an order.
#[tracing::instrument(skip(state, body))]
pub async fn update<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order_id = OrderId::new(parse_id(&id, "order id")?);
    let quantity = validate_quantity(json_body(body)?.quantity)?;

    let order = state.order_service.update_order(order_id, quantity).await?;
    Ok(Json(order.into()))
}

/// DELETE /orders/{id}: delete an order and return its units to stock.
#[tracing::instrument(skip(state))]
pub async fn delete<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let order_id = OrderId::new(parse_id(&id, "order id")?);
    // A lost race with another delete still ends with the order gone.
    state.order_service.delete_order(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
