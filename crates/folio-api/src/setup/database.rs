//! Document store setup

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_core::{Config, DatabaseSettings, StorageBackend};
use folio_db::{DocumentStore, MemoryDocumentStore, PgDocumentStore, StoreHandle};

/// Connect the configured backend.
///
/// Connection or migration failures are logged and yield an unavailable handle
/// rather than aborting startup.
pub async fn setup_store(config: &Config) -> StoreHandle {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            StoreHandle::new(Arc::new(MemoryDocumentStore::new()))
        }
        StorageBackend::Postgres => {
            let Some(url) = config.database.url.as_deref() else {
                tracing::error!("DATABASE_URL not set - form endpoints will answer 503");
                return StoreHandle::unavailable();
            };
            match connect_postgres(url, &config.database).await {
                Ok(store) => StoreHandle::new(Arc::new(store)),
                Err(e) => {
                    tracing::error!(error = %format!("{:#}", e), "Database unavailable - form endpoints will answer 503");
                    StoreHandle::unavailable()
                }
            }
        }
    }
}

async fn connect_postgres(url: &str, settings: &DatabaseSettings) -> Result<PgDocumentStore> {
    tracing::info!("Connecting to database...");
    let store = PgDocumentStore::connect(
        url,
        settings.max_connections,
        Duration::from_secs(settings.timeout_seconds),
    )
    .await
    .context("Failed to connect to database")?;
    store.ping().await.context("Database ping failed")?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Database connected successfully"
    );

    // Workspace migrations/ relative to this crate
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    store
        .migrate(&migrations_dir)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(store)
}
