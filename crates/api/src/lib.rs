//! HTTP API server for the storefront backend.
//!
//! Provides REST endpoints for products and orders on top of the domain
//! services, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use store::{
    InMemoryOrderStore, InMemoryProductStore, OrderStore, PostgresOrderStore,
    PostgresProductStore, ProductStore, StoreError,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;
pub use seed::seed_demo_products;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<P, O>(state: Arc<AppState<P, O>>, metrics_handle: PrometheusHandle) -> Router
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    use routes::{orders, products};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            get(products::list::<P, O>).post(products::create::<P, O>),
        )
        .route(
            "/products/{id}",
            get(products::get::<P, O>)
                .put(products::update::<P, O>)
                .delete(products::delete::<P, O>),
        )
        .route("/orders", axum::routing::post(orders::create::<P, O>))
        .route("/orders/details/{id}", get(orders::get::<P, O>))
        .route(
            "/orders/status/{id}",
            axum::routing::put(orders::update_status::<P, O>),
        )
        .route(
            "/orders/{id}",
            get(orders::list_for_user::<P, O>)
                .put(orders::update::<P, O>)
                .delete(orders::delete::<P, O>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over fresh in-memory stores.
pub fn create_default_state() -> Arc<AppState<InMemoryProductStore, InMemoryOrderStore>> {
    Arc::new(AppState::new(
        InMemoryProductStore::new(),
        InMemoryOrderStore::new(),
    ))
}

/// Creates application state over PostgreSQL stores sharing one pool.
pub fn create_postgres_state(
    pool: PgPool,
) -> Arc<AppState<PostgresProductStore, PostgresOrderStore>> {
    Arc::new(AppState::new(
        PostgresProductStore::new(pool.clone()),
        PostgresOrderStore::new(pool),
    ))
}

/// Opens a connection pool and applies pending migrations.
pub async fn connect_postgres(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    store::run_migrations(&pool).await?;
    Ok(pool)
}
