//! Application setup and initialization
//!
//! Everything `main` needs to go from a `Config` to a running router, split so the
//! integration tests can build the same router around fakes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use folio_core::Config;
use folio_infra::LogFormat;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let log_format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Invalid LOG_FORMAT")?;
    folio_infra::init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated");

    // Storage never blocks startup; without it the form endpoints answer 503
    let store = database::setup_store(&config).await;

    let notifier = services::setup_notifier(&config)?;
    let rate_limiter = routes::setup_rate_limiter();

    let state = Arc::new(
        AppState::new(config.clone(), store, notifier, rate_limiter)
            .context("Invalid rate limit policy")?,
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
