use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod blockchain;
mod config;
mod db;
mod metrics;
mod models;
mod services;

use crate::config::AppConfig;
use crate::db::Database;
use crate::services::ledger::Ledger;
use crate::services::spin::SpinService;

pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub ledger: Ledger,
    /// Spin pipeline; None when the contract/signer are not configured,
    /// in which case the spin endpoints answer 503
    pub spin_service: Option<Arc<SpinService>>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roulette_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting Roulette Backend v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);

    // Initialize Prometheus metrics
    let metrics_handle = metrics::init_metrics()?;
    tracing::info!("Prometheus metrics initialized");

    // Initialize database
    let db = Database::connect(&config.database_url).await?;
    db.run_migrations().await?;
    tracing::info!("Database connected, migrations applied");

    let ledger = Ledger::new(db.pool.clone());

    // Initialize the spin settlement stack (optional)
    let spin_service = if config.has_spin_config() {
        match SpinService::from_config(&config, ledger.clone()) {
            Ok(service) => {
                tracing::info!(
                    "Spin service initialized: chain_id={}, contract={:?}, signer={:?}",
                    config.chain_id,
                    service.contract_address(),
                    service.signer_address()
                );
                Some(Arc::new(service))
            }
            Err(e) => {
                tracing::warn!("Failed to initialize spin service: {}", e);
                None
            }
        }
    } else {
        tracing::info!("Roulette contract/signer not configured, spin endpoints disabled");
        None
    };

    // Build application state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        ledger,
        spin_service,
        metrics_handle,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .nest("/api/v1", api::routes::create_router(state.clone()))
        .layer(middleware::from_fn(api::middleware::metrics_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Prometheus metrics endpoint
async fn metrics_endpoint(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> String {
    state.metrics_handle.render()
}
