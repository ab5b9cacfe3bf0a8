//! # ngoreg-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the NGO zone API. Configuration comes
//! from the environment (see [`AppConfig::from_lookup`]).

use ngoreg_api::middleware::metrics::install_recorder;
use ngoreg_api::state::{AppConfig, AppState};
use ngoreg_store::{init_pool, PgZoneStore, ZoneBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing. NGOREG_LOG_FORMAT=json for log shippers.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json_logs = std::env::var("NGOREG_LOG_FORMAT").is_ok_and(|f| f == "json");
    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    // Database is optional; absent means in-memory only.
    let store = match &config.database_url {
        Some(url) => {
            let pool = init_pool(url, config.max_connections)
                .await
                .map_err(|e| {
                    tracing::error!("Database initialization failed: {e}");
                    e
                })?;
            ZoneBackend::Postgres(PgZoneStore::new(pool))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only. \
                 Zones will not survive restarts."
            );
            ZoneBackend::memory()
        }
    };

    let metrics = install_recorder()?;
    let port = config.port;
    let state = AppState::with_config(config, store).with_metrics(metrics);
    let app = ngoreg_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("ngoreg API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
