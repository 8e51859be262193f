//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the production one from `setup::routes`; only the store and the
//! notifier are swapped for in-process fakes. Run with `cargo test -p folio-api`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use folio_api::setup::routes;
use folio_api::{AppState, Notifier, NotifyError, OutgoingEmail};
use folio_core::Config;
use folio_db::{Collection, MemoryDocumentStore, StoreHandle};
use folio_infra::HttpRateLimiter;
use serde_json::Value;
use tempfile::TempDir;

pub const CONTACT_RECIPIENT: &str = "owner@example.com";
pub const RESUME_BYTES: &[u8] = b"%PDF-1.4 folio test resume";

/// Notifier fake that records every email and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Authentication(
                "535 5.7.8 Username and Password not accepted".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryDocumentStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub config: Config,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub async fn documents(&self, collection: Collection) -> Vec<Value> {
        self.store.documents(collection).await
    }
}

/// Configuration pointing at a temp dir holding a resume and a frontend index.
fn test_config(temp_dir: &TempDir) -> Config {
    let frontend_dir = temp_dir.path().join("frontend");
    std::fs::create_dir_all(frontend_dir.join("assets")).expect("create frontend dir");
    std::fs::write(frontend_dir.join("index.html"), "<h1>folio</h1>").expect("write index");
    let resume_path = frontend_dir.join("assets").join("resume.pdf");
    std::fs::write(&resume_path, RESUME_BYTES).expect("write resume");

    let mut config = Config::default();
    config.frontend_dir = frontend_dir.to_string_lossy().into_owned();
    config.contact_recipient = Some(CONTACT_RECIPIENT.to_string());
    config.resume.path = resume_path.to_string_lossy().into_owned();
    config.resume.owner = Some("Ada Lovelace".to_string());
    // Generous limits so only the rate limit tests hit them
    config.rate_limits.contact = "1000 per hour".to_string();
    config.rate_limits.subscribe = "1000 per hour".to_string();
    config.rate_limits.resume = "1000 per hour".to_string();
    config
}

fn build(config: Config, store: StoreHandle, memory: Arc<MemoryDocumentStore>, temp_dir: TempDir) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = Arc::new(
        AppState::new(
            config.clone(),
            store,
            notifier.clone(),
            Arc::new(HttpRateLimiter::new()),
        )
        .expect("valid rate limit policies"),
    );
    let router = routes::setup_routes(&config, state).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        store: memory,
        notifier,
        config,
        _temp_dir: temp_dir,
    }
}

/// App backed by an available in-memory store.
pub fn spawn_app() -> TestApp {
    spawn_app_with(|_| {})
}

/// Like `spawn_app`, with a chance to adjust the configuration first.
pub fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut config = test_config(&temp_dir);
    customize(&mut config);

    let memory = Arc::new(MemoryDocumentStore::new());
    let store = StoreHandle::new(memory.clone());
    build(config, store, memory, temp_dir)
}

/// App whose storage never connected.
pub fn spawn_app_without_store() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    build(
        config,
        StoreHandle::unavailable(),
        Arc::new(MemoryDocumentStore::new()),
        temp_dir,
    )
}
