use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bytes::Bytes;
use folio_core::{parse_submission, AppError, ContactForm, ContactMessage};

use crate::error::{HttpAppError, StatusResponse};
use crate::middleware::ClientIp;
use crate::services::email::OutgoingEmail;
use crate::state::AppState;

const SAVE_FAILED: &str = "An internal error occurred while saving the message.";

/// POST /api/contact
#[tracing::instrument(skip(state, client_ip, body), fields(client_ip = %client_ip.0))]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    client_ip: ClientIp,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let repos = state.store.repositories()?;
    let form = ContactForm::from_submission(parse_submission(&body)?)?;
    let message = ContactMessage::new(form, client_ip.0);

    repos
        .contacts
        .insert(&message)
        .await
        .map_err(|e| AppError::StorageWrite {
            message: SAVE_FAILED.to_string(),
            cause: e.to_string(),
        })?;

    // Delivery failures never fail the submission; the message is already stored.
    if let Some(recipient) = &state.config.contact_recipient {
        let email = OutgoingEmail::new(
            recipient,
            message.notification_subject(),
            message.notification_body(),
        );
        match state.notifier.send(email).await {
            Ok(()) => tracing::info!(from = %message.email, "Contact notification sent"),
            Err(e) => tracing::warn!(error = %e, from = %message.email, "Contact notification failed"),
        }
    } else {
        tracing::debug!("CONTACT_RECIPIENT not set; skipping contact notification");
    }

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::ok("Message received successfully!")),
    ))
}
