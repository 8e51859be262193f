use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, DocumentStore, Filter, StoreError, StoreResult};

/// Process-local document store.
///
/// Used for local development (`STORAGE_BACKEND=memory`) and tests. Availability
/// and write failures can be toggled to exercise the degraded paths.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<(Uuid, Value)>>>,
    unavailable: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of a collection in insertion order.
    pub async fn documents(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: Collection, document: Value) -> StoreResult<Uuid> {
        self.ensure_available()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("memory store rejected the write".to_string()));
        }
        if !document.is_object() {
            return Err(StoreError::Write("documents must be JSON objects".to_string()));
        }

        let id = Uuid::new_v4();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push((id, document));
        tracing::debug!(collection = %collection, id = %id, "Document inserted");
        Ok(id)
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> StoreResult<Option<Value>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|docs| {
            docs.iter()
                .find(|(_, doc)| filter.matches(doc))
                .map(|(_, doc)| doc.clone())
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_available()
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
