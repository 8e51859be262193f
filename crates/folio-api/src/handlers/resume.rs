use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bytes::Bytes;
use folio_core::{parse_submission, AppError, ResumeForm, ResumeRequest};

use crate::error::{HttpAppError, StatusResponse};
use crate::services::email::{EmailAttachment, NotifyError, OutgoingEmail};
use crate::state::AppState;

const SENT_MESSAGE: &str = "Thank you! The resume has been sent to your email.";
const NOT_SENT_MESSAGE: &str =
    "Your request was received, but we couldn't send the email. Please try again later.";

fn resume_subject(owner: Option<&str>) -> String {
    match owner {
        Some(owner) => format!("Here is a copy of {}'s Resume", owner),
        None => "Here is a copy of my resume".to_string(),
    }
}

fn resume_body(name: &str, owner: Option<&str>) -> String {
    let mut body = format!(
        "Hello {},\n\nThank you for your interest in my profile! Please find my resume attached.\n\nBest regards,",
        name
    );
    if let Some(owner) = owner {
        body.push('\n');
        body.push_str(owner);
    }
    body
}

async fn send_resume(state: &AppState, request: &ResumeRequest) -> Result<(), NotifyError> {
    let settings = &state.config.resume;
    let owner = settings.owner.as_deref();
    let attachment = EmailAttachment::from_path(Path::new(&settings.path), &settings.filename).await?;

    let email = OutgoingEmail::new(
        &request.email,
        resume_subject(owner),
        resume_body(&request.name, owner),
    )
    .with_attachment(attachment);

    state.notifier.send(email).await
}

/// POST /api/request-resume
///
/// The email is attempted before anything is stored, and the request is logged
/// once with its final delivery status. A failed delivery is still recorded but
/// answered with 500 and `success: false`.
#[tracing::instrument(skip(state, body))]
pub async fn request_resume(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let repos = state.store.repositories()?;
    let form = ResumeForm::from_submission(parse_submission(&body)?)?;

    let request = ResumeRequest::received(form);
    let outcome = send_resume(&state, &request).await.map_err(|e| {
        tracing::warn!(error = %e, email = %request.email, "Resume email not delivered");
        e.to_string()
    });
    let request = request.record_delivery(outcome);

    repos
        .resume_requests
        .insert(&request)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store resume request: {}", e)))?;

    if request.is_sent() {
        Ok((StatusCode::OK, Json(StatusResponse::ok(SENT_MESSAGE))))
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::failed(NOT_SENT_MESSAGE)),
        ))
    }
}
