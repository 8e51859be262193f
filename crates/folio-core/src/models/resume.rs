use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ResumeForm;

/// Delivery state of the resume email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

impl std::fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EmailStatus::Pending => "pending",
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A logged resume request.
///
/// Created as `pending`, moved to `sent` or `failed` once the email attempt
/// finishes, and only then persisted, so the stored record always carries its
/// final status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRequest {
    pub name: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub email_status: EmailStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

impl ResumeRequest {
    pub fn received(form: ResumeForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            timestamp: Utc::now(),
            email_status: EmailStatus::Pending,
            email_error: None,
        }
    }

    /// Record the outcome of the email attempt. Only a pending request transitions.
    pub fn record_delivery(mut self, outcome: Result<(), String>) -> Self {
        if self.email_status != EmailStatus::Pending {
            return self;
        }
        match outcome {
            Ok(()) => {
                self.email_status = EmailStatus::Sent;
                self.email_error = None;
            }
            Err(reason) => {
                self.email_status = EmailStatus::Failed;
                self.email_error = Some(if reason.trim().is_empty() {
                    "unknown email failure".to_string()
                } else {
                    reason
                });
            }
        }
        self
    }

    pub fn is_sent(&self) -> bool {
        self.email_status == EmailStatus::Sent
    }
}
