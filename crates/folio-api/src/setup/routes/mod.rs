//! Route configuration and setup.
//!
//! Form endpoints live under `/api` (the only routes with CORS), probes at
//! `/health` and `/ready`; everything else falls through to the static frontend.

mod health;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use folio_core::{AppError, Config};
use folio_infra::{request_id_middleware, HttpRateLimiter};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::HttpAppError;
use crate::handlers;
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;

/// How often expired limiter buckets are swept.
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let request_timeout_secs = config.request_timeout_secs.max(1);
    tracing::info!(
        request_timeout_secs,
        max_body_bytes = config.max_body_bytes,
        "Request timeout and body limit layers enabled"
    );

    let frontend = ServeDir::new(&config.frontend_dir).append_index_html_on_directories(true);

    let app = Router::new()
        .nest("/api", api_routes(&state).layer(cors))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .fallback_service(frontend)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state);

    Ok(app)
}

fn api_routes(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/contact",
            post(handlers::contact::submit_contact)
                .route_layer(from_fn_with_state(state.contact_limit(), rate_limit_middleware)),
        )
        .route(
            "/subscribe",
            post(handlers::subscribe::subscribe)
                .route_layer(from_fn_with_state(state.subscribe_limit(), rate_limit_middleware)),
        )
        .route(
            "/request-resume",
            post(handlers::resume::request_resume)
                .route_layer(from_fn_with_state(state.resume_limit(), rate_limit_middleware)),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new().allow_origin(AnyOrigin)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
        CorsLayer::new().allow_origin(origins)
    };

    Ok(cors
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Shared limiter plus a background sweep of expired buckets.
pub fn setup_rate_limiter() -> Arc<HttpRateLimiter> {
    let rate_limiter = Arc::new(HttpRateLimiter::new());

    let rate_limiter_for_cleanup = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            rate_limiter_for_cleanup.cleanup_expired_buckets().await;
        }
    });

    tracing::info!(
        cleanup_interval_secs = RATE_LIMIT_CLEANUP_INTERVAL.as_secs(),
        "Per-IP rate limiting enabled"
    );
    rate_limiter
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");
    HttpAppError(AppError::Internal(format!("panic: {}", detail))).into_response()
}
