//! Per-collection repositories over a `DocumentStore`.

pub mod contact;
pub mod resume;
pub mod subscriber;

use std::sync::Arc;

use crate::store::DocumentStore;

pub use contact::ContactRepository;
pub use resume::ResumeRequestRepository;
pub use subscriber::SubscriberRepository;

/// All repositories sharing one store.
#[derive(Clone)]
pub struct Repositories {
    pub contacts: ContactRepository,
    pub subscribers: SubscriberRepository,
    pub resume_requests: ResumeRequestRepository,
}

impl Repositories {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            contacts: ContactRepository::new(store.clone()),
            subscribers: SubscriberRepository::new(store.clone()),
            resume_requests: ResumeRequestRepository::new(store),
        }
    }
}
