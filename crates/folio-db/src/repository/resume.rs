use std::sync::Arc;

use folio_core::ResumeRequest;
use uuid::Uuid;

use crate::store::{Collection, DocumentStore, StoreResult};

#[derive(Clone)]
pub struct ResumeRequestRepository {
    store: Arc<dyn DocumentStore>,
}

impl ResumeRequestRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a resume request with its final email status
    #[tracing::instrument(skip(self, request), fields(db.collection = "resume_requests", db.operation = "insert"))]
    pub async fn insert(&self, request: &ResumeRequest) -> StoreResult<Uuid> {
        let document = serde_json::to_value(request)?;
        let id = self.store.insert(Collection::ResumeRequests, document).await?;
        tracing::info!(
            id = %id,
            name = %request.name,
            email = %request.email,
            email_status = %request.email_status,
            "Resume request stored"
        );
        Ok(id)
    }
}
