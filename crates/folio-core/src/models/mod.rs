//! Domain models persisted by the service.
//!
//! Every record is an append-only document; nothing here is updated after insert.

pub mod contact;
pub mod newsletter;
pub mod resume;

pub use contact::ContactMessage;
pub use newsletter::NewsletterSubscription;
pub use resume::{EmailStatus, ResumeRequest};
