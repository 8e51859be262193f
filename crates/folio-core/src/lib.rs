//! Folio Core Library
//!
//! This crate provides the domain models, error types, configuration, and request
//! validation shared by the Folio service crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, DatabaseSettings, RateLimitSettings, ResumeSettings, SmtpSettings, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ContactMessage, EmailStatus, NewsletterSubscription, ResumeRequest};
pub use validation::{
    is_valid_email, parse_submission, ContactForm, FieldErrors, ResumeForm, Submission,
    SubscriptionForm,
};
