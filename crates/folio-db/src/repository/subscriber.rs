use std::sync::Arc;

use folio_core::NewsletterSubscription;
use uuid::Uuid;

use crate::store::{Collection, DocumentStore, Filter, StoreResult};

#[derive(Clone)]
pub struct SubscriberRepository {
    store: Arc<dyn DocumentStore>,
}

impl SubscriberRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Look up an existing subscription by email
    #[tracing::instrument(skip(self), fields(db.collection = "newsletter_subscribers", db.operation = "select"))]
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<NewsletterSubscription>> {
        let document = self
            .store
            .find_one(Collection::NewsletterSubscribers, &Filter::eq("email", email))
            .await?;
        document
            .map(serde_json::from_value::<NewsletterSubscription>)
            .transpose()
            .map_err(Into::into)
    }

    /// Store a new subscription. Duplicate detection is the caller's job.
    #[tracing::instrument(skip(self, subscription), fields(db.collection = "newsletter_subscribers", db.operation = "insert"))]
    pub async fn insert(&self, subscription: &NewsletterSubscription) -> StoreResult<Uuid> {
        let document = serde_json::to_value(subscription)?;
        self.store
            .insert(Collection::NewsletterSubscribers, document)
            .await
    }
}
