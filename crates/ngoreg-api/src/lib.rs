//! # ngoreg-api — Axum API for NGO Intervention Zones
//!
//! HTTP boundary of the zone hierarchy resolver. The registration form
//! edits a flat, name-keyed zone list (through `/v1/zones/toggle`), checks
//! it (`/v1/zones/validate`), and saves it against an NGO, where the
//! three-pass resolver turns it into identifier-keyed rows.
//!
//! ## API Surface
//!
//! | Prefix                   | Module                | Domain           |
//! |--------------------------|-----------------------|------------------|
//! | `/v1/ngos/{ngo_id}/zones`| [`routes::zones`]     | Stored zones     |
//! | `/v1/zones/*`            | [`routes::editing`]   | Form helpers     |
//! | `/openapi.json`          | [`openapi`]           | API description  |
//! | `/metrics`               | [`middleware::metrics`] | Prometheus     |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! Health probes (`/health/*`) are mounted outside the middleware stack.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::zones::router())
        .merge(routes::editing::router())
        .merge(openapi::router())
        .route("/metrics", get(middleware::metrics::render))
        .route_layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the zone store answers.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.ready().await.map_err(|e| {
        tracing::warn!(store = state.store.kind(), error = %e, "readiness check failed");
        AppError::ServiceUnavailable(format!("{} store not ready", state.store.kind()))
    })?;
    Ok("ready")
}
