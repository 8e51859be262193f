use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bytes::Bytes;
use folio_core::{parse_submission, AppError, NewsletterSubscription, SubscriptionForm};
use folio_db::StoreError;

use crate::error::{HttpAppError, StatusResponse};
use crate::state::AppState;

/// POST /api/subscribe
///
/// Idempotent: an address that is already subscribed gets 200 and nothing is
/// written. The lookup and insert are not atomic, so two concurrent first-time
/// requests for the same address may both be stored.
#[tracing::instrument(skip(state, body))]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let repos = state.store.repositories()?;
    let form = SubscriptionForm::from_submission(parse_submission(&body)?)?;

    let existing = repos
        .subscribers
        .find_by_email(&form.email)
        .await
        .map_err(|e| match e {
            StoreError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            other => AppError::Internal(format!("Subscriber lookup failed: {}", other)),
        })?;

    if existing.is_some() {
        tracing::info!(email = %form.email, "Subscriber already registered");
        return Ok((
            StatusCode::OK,
            Json(StatusResponse::ok("You are already subscribed!")),
        ));
    }

    let subscription = NewsletterSubscription::new(form.email);
    repos
        .subscribers
        .insert(&subscription)
        .await
        .map_err(|e| AppError::storage_write(e.to_string()))?;
    tracing::info!(email = %subscription.email, "New newsletter subscriber");

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::ok("Thank you for subscribing!")),
    ))
}
