//! Contact form integration tests.
//!
//! Run with: `cargo test -p folio-api --test contact_test`

mod helpers;

use folio_db::Collection;
use helpers::{spawn_app, spawn_app_with, CONTACT_RECIPIENT};
use serde_json::{json, Value};

#[tokio::test]
async fn test_minimal_contact_is_stored_with_default_subject() {
    let app = spawn_app();

    let response = app
        .client()
        .post("/api/contact")
        .add_header("X-Forwarded-For", "203.0.113.5")
        .json(&json!({"name": "A", "email": "a@b.com", "message": "hi"}))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(
        response.json::<Value>(),
        json!({"success": true, "message": "Message received successfully!"})
    );

    let docs = app.documents(Collection::ContactForm).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], "A");
    assert_eq!(docs[0]["email"], "a@b.com");
    assert_eq!(docs[0]["subject"], "No Subject");
    assert_eq!(docs[0]["message"], "hi");
    assert_eq!(docs[0]["source_ip"], "203.0.113.5");
    assert!(docs[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_contact_notifies_recipient() {
    let app = spawn_app();

    let response = app
        .client()
        .post("/api/contact")
        .json(&json!({
            "name": "Grace",
            "email": "grace@example.com",
            "subject": "Collaboration",
            "message": "Let's talk"
        }))
        .await;
    assert_eq!(response.status_code(), 201);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, CONTACT_RECIPIENT);
    assert_eq!(sent[0].subject, "New Portfolio Contact: Collaboration");
    assert!(sent[0].body.contains("grace@example.com"));
    assert!(sent[0].body.contains("Let's talk"));
    assert!(sent[0].attachment.is_none());
}

#[tokio::test]
async fn test_missing_fields_are_reported_per_field() {
    let app = spawn_app();

    let response = app
        .client()
        .post("/api/contact")
        .json(&json!({"email": "a@b.com", "message": "   "}))
        .await;

    assert_eq!(response.status_code(), 400);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["name"], "Name is a required field.");
    assert_eq!(body["details"]["message"], "Message is a required field.");
    assert!(body["details"].get("email").is_none());

    assert!(app.documents(Collection::ContactForm).await.is_empty());
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let app = spawn_app();

    for email in ["not-an-email", "a@b", "a b@c.com", "@b.com"] {
        let response = app
            .client()
            .post("/api/contact")
            .json(&json!({"name": "A", "email": email, "message": "hi"}))
            .await;

        assert_eq!(response.status_code(), 400, "email {:?}", email);
        assert_eq!(
            response.json::<Value>()["details"]["email"],
            "A valid email address format is required."
        );
    }
    assert!(app.documents(Collection::ContactForm).await.is_empty());
}

#[tokio::test]
async fn test_missing_or_malformed_body() {
    let app = spawn_app();

    let empty = app.client().post("/api/contact").await;
    assert_eq!(empty.status_code(), 400);
    assert_eq!(
        empty.json::<Value>(),
        json!({"error": "Missing JSON in request body"})
    );

    let malformed = app
        .client()
        .post("/api/contact")
        .text("{\"name\": ")
        .await;
    assert_eq!(malformed.status_code(), 400);
    assert_eq!(malformed.json::<Value>()["error"], "Missing JSON in request body");

    let not_object = app.client().post("/api/contact").json(&json!(["a"])).await;
    assert_eq!(not_object.status_code(), 400);
    assert_eq!(not_object.json::<Value>()["error"], "Missing JSON in request body");
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_submission() {
    let app = spawn_app();
    app.notifier.set_failing(true);

    let response = app
        .client()
        .post("/api/contact")
        .json(&json!({"name": "A", "email": "a@b.com", "message": "hi"}))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(app.documents(Collection::ContactForm).await.len(), 1);
}

#[tokio::test]
async fn test_no_recipient_means_no_notification() {
    let app = spawn_app_with(|config| config.contact_recipient = None);

    let response = app
        .client()
        .post("/api/contact")
        .json(&json!({"name": "A", "email": "a@b.com", "message": "hi"}))
        .await;

    assert_eq!(response.status_code(), 201);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_write_failure_returns_500() {
    let app = spawn_app();
    app.store.set_fail_writes(true);

    let response = app
        .client()
        .post("/api/contact")
        .json(&json!({"name": "A", "email": "a@b.com", "message": "hi"}))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "An internal error occurred while saving the message."})
    );
    assert!(app.notifier.sent().is_empty());
}
