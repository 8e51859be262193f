//! Request validation
//!
//! Submissions arrive as loosely typed JSON objects. `parse_submission` turns the
//! raw body into a field map, and the form types below pull required fields out of
//! it while collecting one message per offending field. Nothing in here touches
//! storage or the network.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Default subject for contact messages submitted without one.
pub const DEFAULT_SUBJECT: &str = "No Subject";

// local-part "@" domain-part "." tld-part, no whitespace anywhere
static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Permissive syntactic email check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// A parsed JSON object body plus the errors collected while reading it.
#[derive(Debug)]
pub struct Submission {
    fields: Map<String, Value>,
    errors: FieldErrors,
}

/// Parse a request body into a field map.
///
/// An empty body, malformed JSON, or a JSON value that is not an object are all
/// reported as `AppError::MissingBody`, distinct from per-field failures.
pub fn parse_submission(body: &[u8]) -> Result<Submission, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::MissingBody);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) if !fields.is_empty() => Ok(Submission {
            fields,
            errors: FieldErrors::default(),
        }),
        _ => Err(AppError::MissingBody),
    }
}

impl Submission {
    fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Non-empty string field; records "`<label>` is a required field." otherwise.
    pub fn required_text(&mut self, field: &str, label: &str) -> Option<String> {
        let value = self.text(field);
        if value.is_none() {
            self.errors
                .insert(field, format!("{} is a required field.", label));
        }
        value
    }

    /// Required field that must also look like an email address.
    pub fn required_email(&mut self, field: &str, label: &str) -> Option<String> {
        let value = self.required_text(field, label)?;
        if !is_valid_email(&value) {
            self.errors
                .insert(field, "A valid email address format is required.");
            return None;
        }
        Some(value)
    }

    /// Optional string field; blank values count as absent.
    pub fn optional_text(&self, field: &str) -> Option<String> {
        self.text(field)
    }

    fn into_errors(self) -> AppError {
        AppError::Validation(self.errors)
    }
}

/// Validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn from_submission(mut submission: Submission) -> Result<Self, AppError> {
        let name = submission.required_text("name", "Name");
        let email = submission.required_email("email", "Email");
        let message = submission.required_text("message", "Message");
        let subject = submission
            .optional_text("subject")
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(Self {
                name,
                email,
                subject,
                message,
            }),
            _ => Err(submission.into_errors()),
        }
    }
}

/// Validated newsletter subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionForm {
    /// Lowercased so repeat subscriptions match regardless of case.
    pub email: String,
}

impl SubscriptionForm {
    pub fn from_submission(mut submission: Submission) -> Result<Self, AppError> {
        match submission.required_email("email", "Email") {
            Some(email) => Ok(Self {
                email: email.to_lowercase(),
            }),
            None => Err(submission.into_errors()),
        }
    }
}

/// Validated resume request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeForm {
    pub name: String,
    pub email: String,
}

impl ResumeForm {
    pub fn from_submission(mut submission: Submission) -> Result<Self, AppError> {
        let name = submission.required_text("name", "Name");
        let email = submission.required_email("email", "Email");
        match (name, email) {
            (Some(name), Some(email)) => Ok(Self { name, email }),
            _ => Err(submission.into_errors()),
        }
    }
}
