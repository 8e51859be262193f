use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Collection, DocumentStore, Filter, StoreError, StoreResult};

/// Documents in a single `documents` table, one JSONB body per row.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

/// Connection-level failures mean the store is unreachable; anything else is a
/// failure of the statement itself.
fn classify(err: sqlx::Error, otherwise: fn(String) -> StoreError) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        other => otherwise(other.to_string()),
    }
}

impl PgDocumentStore {
    /// Connect with a bounded acquire timeout.
    pub async fn connect(url: &str, max_connections: u32, timeout: Duration) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Apply pending migrations from `dir`.
    pub async fn migrate(&self, dir: &Path) -> Result<(), sqlx::migrate::MigrateError> {
        let migrator = sqlx::migrate::Migrator::new(dir).await?;
        migrator.run(&self.pool).await
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, document), fields(db.collection = %collection, db.operation = "insert"))]
    async fn insert(&self, collection: Collection, document: Value) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(collection.as_str())
        .bind(&document)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to insert document");
            classify(e, StoreError::Write)
        })?;

        Ok(id)
    }

    #[tracing::instrument(skip(self, filter), fields(db.collection = %collection, db.operation = "select"))]
    async fn find_one(&self, collection: Collection, filter: &Filter) -> StoreResult<Option<Value>> {
        let body = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(collection.as_str())
        .bind(filter.to_value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to query documents");
            classify(e, StoreError::Query)
        })?;

        Ok(body)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(drop)
            .map_err(|e| classify(e, StoreError::Query))
    }

    fn is_available(&self) -> bool {
        !self.pool.is_closed()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
