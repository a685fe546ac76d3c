mod access;
mod auth;
mod calendar;
mod clock;
mod config;
mod db;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod startup;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // JSON output in production, human-readable otherwise
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string())
        == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,shiftdesk_axum=debug,tower_http=debug".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    let db = db::create_pool(&config.database_url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create database pool");
        e
    })?;
    tracing::info!("Database pool created");

    sqlx::migrate!().run(&db).await?;
    tracing::info!("Migrations applied");

    let metrics = Arc::new(handlers::setup_metrics_recorder());

    let port = config.port;
    let state = Arc::new(AppState { db, config, metrics });

    let app = startup::build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
