//! Document store abstraction
//!
//! Every backend must implement `DocumentStore`. Handlers never hold a backend
//! directly; they go through `StoreHandle`, which answers "is storage usable right
//! now" before any write is attempted.

pub mod memory;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use folio_core::AppError;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection missing, closed, or timed out before the operation ran
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            StoreError::Write(msg) => AppError::storage_write(msg),
            StoreError::Query(msg) => AppError::Internal(format!("Storage query failed: {}", msg)),
            StoreError::Serialization(e) => {
                AppError::Internal(format!("Document serialization failed: {}", e))
            }
        }
    }
}

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    ContactForm,
    NewsletterSubscribers,
    ResumeRequests,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::ContactForm => "contact_form",
            Collection::NewsletterSubscribers => "newsletter_subscribers",
            Collection::ResumeRequests => "resume_requests",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of top-level field equalities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::default().and(field, value)
    }

    pub fn and(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// The filter as a JSON object (JSONB containment operand in Postgres).
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Whether `document` carries every field of the filter with an equal value.
    pub fn matches(&self, document: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

/// Document store abstraction trait
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its generated id.
    async fn insert(&self, collection: Collection, document: Value) -> StoreResult<Uuid>;

    /// First document (oldest) in `collection` matching `filter`.
    async fn find_one(&self, collection: Collection, filter: &Filter) -> StoreResult<Option<Value>>;

    /// Round-trip to the backend.
    async fn ping(&self) -> StoreResult<()>;

    /// Cheap, non-blocking availability check used before attempting writes.
    fn is_available(&self) -> bool;

    /// Backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Shared handle to the configured store, or nothing if startup could not connect.
#[derive(Clone, Default)]
pub struct StoreHandle {
    store: Option<Arc<dyn DocumentStore>>,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn unavailable() -> Self {
        Self { store: None }
    }

    /// The store, if it is configured and currently usable.
    pub fn available(&self) -> StoreResult<Arc<dyn DocumentStore>> {
        match &self.store {
            Some(store) if store.is_available() => Ok(store.clone()),
            Some(store) => Err(StoreError::Unavailable(format!(
                "{} connection is closed",
                store.backend_name()
            ))),
            None => Err(StoreError::Unavailable(
                "no database connection was established".to_string(),
            )),
        }
    }

    /// Repositories over the available store.
    pub fn repositories(&self) -> StoreResult<crate::Repositories> {
        self.available().map(crate::Repositories::new)
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }
}
