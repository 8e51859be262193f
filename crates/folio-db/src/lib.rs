//! Folio persistence
//!
//! Records are stored as JSON documents grouped into named collections. The
//! `DocumentStore` trait is the only thing the rest of the service sees; the
//! Postgres backend keeps documents in a single JSONB table and the memory backend
//! keeps them in process.

pub mod repository;
pub mod store;

pub use repository::{ContactRepository, Repositories, ResumeRequestRepository, SubscriberRepository};
pub use store::memory::MemoryDocumentStore;
pub use store::postgres::PgDocumentStore;
pub use store::{Collection, DocumentStore, Filter, StoreError, StoreHandle, StoreResult};
