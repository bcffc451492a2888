//! Product catalogue endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use store::{NewProduct, OrderStore, Page, Product, ProductChanges, ProductStore};

use super::{AppState, json_body, parse_id, query_params};
use crate::error::ApiError;

const NAME_LEN: std::ops::RangeInclusive<usize> = 3..=100;
const DESCRIPTION_LEN: std::ops::RangeInclusive<usize> = 10..=500;
const MAX_LIMIT: u32 = 100;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    fn into_page(self) -> Result<Page, ApiError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(Page::DEFAULT_LIMIT);
        if page < 1 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Page::new(page, limit))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
}

fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if !NAME_LEN.contains(&name.chars().count()) {
        return Err(ApiError::BadRequest(format!(
            "name must be between {} and {} characters",
            NAME_LEN.start(),
            NAME_LEN.end()
        )));
    }
    Ok(name.to_string())
}

fn validate_description(description: &str) -> Result<String, ApiError> {
    let description = description.trim();
    if !DESCRIPTION_LEN.contains(&description.chars().count()) {
        return Err(ApiError::BadRequest(format!(
            "description must be between {} and {} characters",
            DESCRIPTION_LEN.start(),
            DESCRIPTION_LEN.end()
        )));
    }
    Ok(description.to_string())
}

fn validate_price(price_cents: i64) -> Result<Money, ApiError> {
    if price_cents <= 0 {
        return Err(ApiError::BadRequest(
            "price_cents must be positive".to_string(),
        ));
    }
    Ok(Money::from_cents(price_cents))
}

fn validate_stock(stock: i64) -> Result<i64, ApiError> {
    if stock < 0 {
        return Err(ApiError::BadRequest(
            "stock cannot be negative".to_string(),
        ));
    }
    Ok(stock)
}

impl CreateProductRequest {
    fn validate(self) -> Result<NewProduct, ApiError> {
        let description = match self.description {
            Some(ref description) => validate_description(description)?,
            None => String::new(),
        };
        Ok(NewProduct::new(
            validate_name(&self.name)?,
            description,
            validate_price(self.price_cents)?,
            validate_stock(self.stock)?,
        ))
    }
}

impl UpdateProductRequest {
    fn validate(self) -> Result<ProductChanges, ApiError> {
        let changes = ProductChanges {
            name: self.name.as_deref().map(validate_name).transpose()?,
            description: self
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            price: self.price_cents.map(validate_price).transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
        };
        if changes.is_empty() {
            return Err(ApiError::BadRequest(
                "at least one field must be provided".to_string(),
            ));
        }
        Ok(changes)
    }
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name,
            description: product.description,
            price_cents: product.price.cents(),
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

// -- Handlers --

/// GET /products?page&limit
#[tracing::instrument(skip(state, query))]
pub async fn list<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductResponse>>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let page = query_params(query)?.into_page()?;
    let products = state.product_service.list_products(page).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let id = ProductId::new(parse_id(&id, "id")?);
    let product = state.product_service.get_product(id).await?;
    Ok(Json(product.into()))
}

/// POST /products
#[tracing::instrument(skip(state, body))]
pub async fn create<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let product = json_body(body)?.validate()?;
    let product = state.product_service.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /products/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let id = ProductId::new(parse_id(&id, "id")?);
    let changes = json_body(body)?.validate()?;
    let product = state.product_service.update_product(id, changes).await?;
    Ok(Json(product.into()))
}

/// DELETE /products/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    let id = ProductId::new(parse_id(&id, "id")?);
    state.product_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
