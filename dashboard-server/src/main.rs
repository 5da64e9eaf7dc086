//! NIDS Dashboard Server
//!
//! Scores the configured flow input once at startup and serves the alert
//! batch, its aggregations and a reload endpoint over JSON.
//!
//! ```text
//! CSV ─▶ nids-core Pipeline ─▶ ScoredBatch (RwLock<Arc<_>>) ─▶ Axum handlers
//!                ▲                                                 │
//!                └──────────────── POST /api/v1/reload ◀──────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod state;


use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;

pub use error::{AppError, AppResult};
pub use state::{AppState, ScoredBatch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nids_dashboard=debug,nids_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("NIDS Dashboard v{} starting...", env!("CARGO_PKG_VERSION"));
    anyhow::ensure!(
        config.input.is_some() || config.synthetic_rows.is_some(),
        "NIDS_INPUT is not set (use NIDS_SYNTHETIC_ROWS for explicit demo data)"
    );

    // Score the configured input before accepting requests
    let startup_config = config.clone();
    let batch = tokio::task::spawn_blocking(move || ScoredBatch::load(&startup_config))
        .await?
        .context("initial scoring failed")?;
    tracing::info!(
        "Scored {} alerts from {} (severity_source={}, scorer={})",
        batch.alerts.len(),
        batch.input,
        batch.severity_source.as_str(),
        batch.scorer
    );

    let state = AppState::new(config.clone(), batch);
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/v1/alerts", get(handlers::alerts::list))
        .route("/api/v1/summary", get(handlers::summary::summary))
        .route("/api/v1/describe", get(handlers::summary::describe))
        .route("/api/v1/charts/traffic", get(handlers::charts::traffic))
        .route("/api/v1/charts/severity", get(handlers::charts::severity))
        .route("/api/v1/charts/top-talkers", get(handlers::charts::top_talkers))
        .route("/api/v1/reload", post(handlers::reload::reload));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
