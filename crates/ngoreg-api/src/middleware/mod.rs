//! # Middleware
//!
//! - `tracing_layer` — request spans via `tower_http::trace::TraceLayer`.
//! - `metrics` — per-request counters and latency fed to the `metrics`
//!   recorder, and the Prometheus exporter setup.

pub mod metrics;
pub mod tracing_layer;
