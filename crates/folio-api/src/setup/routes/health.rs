//! Health check handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    pub storage: String,
    pub storage_backend: Option<&'static str>,
    pub email: &'static str,
}

/// Ping the store with a timeout: "healthy", "timeout", "not_configured" or "unhealthy: ...".
async fn check_storage(state: &AppState) -> (String, Option<&'static str>) {
    let store = match state.store.available() {
        Ok(store) => store,
        Err(_) if !state.store.is_configured() => return ("not_configured".to_string(), None),
        Err(e) => return (format!("unhealthy: {}", e), None),
    };

    let backend = Some(store.backend_name());
    let status = match tokio::time::timeout(CHECK_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("unhealthy: {}", e),
        Err(_) => "timeout".to_string(),
    };
    (status, backend)
}

/// GET /health: storage and email status; 503 while storage is down.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (storage, storage_backend) = check_storage(&state).await;
    let healthy = storage == "healthy";

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "degraded" },
        storage,
        storage_backend,
        email: if state.notifier.is_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response))
}

/// GET /ready: ready only when storage answers.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (storage, _) = check_storage(&state).await;
    if storage == "healthy" {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready" })),
        )
    } else {
        tracing::warn!(storage = %storage, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "storage": storage })),
        )
    }
}
