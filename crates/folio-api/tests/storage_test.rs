//! Behaviour while storage is unavailable.
//!
//! Run with: `cargo test -p folio-api --test storage_test`

mod helpers;

use folio_db::Collection;
use helpers::{spawn_app, spawn_app_without_store};
use serde_json::{json, Value};

const ENDPOINTS: [&str; 3] = ["/api/contact", "/api/subscribe", "/api/request-resume"];

#[tokio::test]
async fn test_every_endpoint_answers_503_without_store() {
    let app = spawn_app_without_store();

    for path in ENDPOINTS {
        // Valid and invalid bodies alike: storage is checked before validation
        for body in [
            json!({"name": "A", "email": "a@b.com", "message": "hi"}),
            json!({"email": "nope"}),
        ] {
            let response = app.client().post(path).json(&body).await;
            assert_eq!(response.status_code(), 503, "{}", path);
            assert_eq!(
                response.json::<Value>(),
                json!({"error": "Database connection not available"})
            );
        }

        let empty = app.client().post(path).await;
        assert_eq!(empty.status_code(), 503, "{}", path);
    }

    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_store_going_down_and_recovering() {
    let app = spawn_app();
    app.store.set_available(false);

    let response = app
        .client()
        .post("/api/subscribe")
        .json(&json!({"email": "reader@example.com"}))
        .await;
    assert_eq!(response.status_code(), 503);

    let response = app
        .client()
        .post("/api/request-resume")
        .json(&json!({"name": "Grace", "email": "grace@example.com"}))
        .await;
    assert_eq!(response.status_code(), 503);
    assert!(app.notifier.sent().is_empty());

    app.store.set_available(true);
    let response = app
        .client()
        .post("/api/subscribe")
        .json(&json!({"email": "reader@example.com"}))
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(app.documents(Collection::NewsletterSubscribers).await.len(), 1);
}

#[tokio::test]
async fn test_health_reflects_storage() {
    let app = spawn_app();

    let health = app.client().get("/health").await;
    assert_eq!(health.status_code(), 200);
    let body = health.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["storage_backend"], "memory");

    let ready = app.client().get("/ready").await;
    assert_eq!(ready.status_code(), 200);

    app.store.set_available(false);
    let health = app.client().get("/health").await;
    assert_eq!(health.status_code(), 503);
    assert_eq!(health.json::<Value>()["status"], "degraded");

    let ready = app.client().get("/ready").await;
    assert_eq!(ready.status_code(), 503);
    assert_eq!(ready.json::<Value>()["status"], "not_ready");
}

#[tokio::test]
async fn test_health_without_store_is_not_configured() {
    let app = spawn_app_without_store();

    let health = app.client().get("/health").await;
    assert_eq!(health.status_code(), 503);
    assert_eq!(health.json::<Value>()["storage"], "not_configured");
}
