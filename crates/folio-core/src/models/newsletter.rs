use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A newsletter subscriber. `email` is the logical unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

impl NewsletterSubscription {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            timestamp: Utc::now(),
        }
    }
}
