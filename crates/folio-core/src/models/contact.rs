use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ContactForm;

/// A message left through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub source_ip: String,
}

impl ContactMessage {
    pub fn new(form: ContactForm, source_ip: impl Into<String>) -> Self {
        Self {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
            timestamp: Utc::now(),
            source_ip: source_ip.into(),
        }
    }

    /// Subject line of the owner notification.
    pub fn notification_subject(&self) -> String {
        format!("New Portfolio Contact: {}", self.subject)
    }

    /// Plain-text body of the owner notification.
    pub fn notification_body(&self) -> String {
        format!(
            "You have a new message from your portfolio contact form:\n\
             Name: {}\n\
             Email: {}\n\
             IP Address: {}\n\
             Message:\n\
             {}",
            self.name, self.email, self.source_ip, self.message
        )
    }
}
