use std::sync::Arc;

use folio_core::ContactMessage;
use uuid::Uuid;

use crate::store::{Collection, DocumentStore, StoreResult};

#[derive(Clone)]
pub struct ContactRepository {
    store: Arc<dyn DocumentStore>,
}

impl ContactRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a contact form message
    #[tracing::instrument(skip(self, message), fields(db.collection = "contact_form", db.operation = "insert"))]
    pub async fn insert(&self, message: &ContactMessage) -> StoreResult<Uuid> {
        let document = serde_json::to_value(message)?;
        let id = self.store.insert(Collection::ContactForm, document).await?;
        tracing::info!(id = %id, email = %message.email, "Contact message stored");
        Ok(id)
    }
}
