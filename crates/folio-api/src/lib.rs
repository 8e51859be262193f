//! Folio API Library
//!
//! HTTP handlers, middleware, outbound email and application setup for the
//! portfolio backend.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError, StatusResponse};
pub use services::email::{
    DisabledNotifier, EmailAttachment, Notifier, NotifyError, OutgoingEmail, SmtpNotifier,
};
pub use state::AppState;
