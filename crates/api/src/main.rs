//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use api::AppState;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{OrderStore, ProductStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Seeds if asked, then serves until a shutdown signal arrives.
async fn serve<P, O>(config: &Config, state: Arc<AppState<P, O>>, metrics_handle: PrometheusHandle)
where
    P: ProductStore + Clone + 'static,
    O: OrderStore + 'static,
{
    if config.seed_demo_data {
        api::seed_demo_products(&state.product_service)
            .await
            .expect("failed to seed demo products");
    }

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env().expect("invalid configuration");
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the stores and serve
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = api::connect_postgres(url, config.database_max_connections)
                .await
                .expect("failed to connect to PostgreSQL");
            tracing::info!(
                max_connections = config.database_max_connections,
                "using PostgreSQL stores"
            );
            serve(&config, api::create_postgres_state(pool), metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            serve(&config, api::create_default_state(), metrics_handle).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
