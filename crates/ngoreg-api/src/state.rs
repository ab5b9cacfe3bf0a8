//! # Application State & Configuration
//!
//! `AppConfig` is read from the environment once at startup. `AppState` is
//! cloned into every handler: it holds the zone backend (cheap to clone; the
//! memory store and the Postgres pool are both shared handles), the config,
//! and the Prometheus handle when the exporter is installed.

use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;

use ngoreg_store::{ResolutionMode, ZoneBackend};

/// Configuration errors raised while reading the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration.
///
/// Custom `Debug` redacts `database_url`, which may carry a password.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    /// Maximum Postgres connections.
    pub max_connections: u32,
    /// How orphaned zones are handled on save.
    pub resolution_mode: ResolutionMode,
    /// Upper bound on one zone write (create, update or delete).
    pub write_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("max_connections", &self.max_connections)
            .field("resolution_mode", &self.resolution_mode)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            max_connections: 10,
            resolution_mode: ResolutionMode::Lenient,
            write_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `PORT` | `8080` |
    /// | `DATABASE_URL` | unset (in-memory) |
    /// | `NGOREG_DB_MAX_CONNECTIONS` | `10` |
    /// | `NGOREG_RESOLUTION_MODE` | `lenient` |
    /// | `NGOREG_WRITE_TIMEOUT_SECS` | `10` |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT", defaults.port)?;
        let max_connections =
            parse_var(&lookup, "NGOREG_DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let resolution_mode = parse_var(
            &lookup,
            "NGOREG_RESOLUTION_MODE",
            defaults.resolution_mode,
        )?;
        let timeout_secs: u64 = parse_var(
            &lookup,
            "NGOREG_WRITE_TIMEOUT_SECS",
            defaults.write_timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "NGOREG_WRITE_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let database_url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty());

        Ok(Self {
            port,
            database_url,
            max_connections,
            resolution_mode,
            write_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: ZoneBackend,
    pub config: AppConfig,
    /// Renders `/metrics`. `None` when no exporter is installed (tests).
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.kind())
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// In-memory store, default configuration, no metrics exporter.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), ZoneBackend::memory())
    }

    pub fn with_config(config: AppConfig, store: ZoneBackend) -> Self {
        Self {
            store,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
