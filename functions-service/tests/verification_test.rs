mod common;

use chrono::{Duration, Utc};
use common::{user_with_email, TestApp};
use functions_service::models::{User, Verification};
use reqwest::Client;
use serde_json::json;

async fn trigger_user_created(app: &TestApp, client: &Client, user_id: &str) -> reqwest::Response {
    let user = app.user(user_id).await;
    client
        .post(format!("{}/triggers/user_created", app.address))
        .json(&json!({ "userId": user_id, "user": user }))
        .send()
        .await
        .expect("Failed to execute request")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "functions-service");
}

// =============================================================================
// Trigger A: user created
// =============================================================================

#[tokio::test]
async fn user_creation_issues_one_token_and_one_email() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    app.seed_user("u1", user_with_email("a@example.com")).await;

    let response = trigger_user_created(&app, &client, "u1").await;
    assert_eq!(response.status(), 202);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "sent");

    // Exactly one verification token written, with a future expiry
    let user = app.user("u1").await;
    let verification = user.verification.expect("verification sub-record missing");
    assert_eq!(verification.token.len(), 64);
    assert!(verification.expires_at > Utc::now());

    // Exactly one email attempted, to the user's address, containing the link
    assert_eq!(app.mailbox.send_count(), 1);
    let sent = app.mailbox.sent_messages();
    assert_eq!(sent[0].to, vec!["a@example.com"]);
    let html = sent[0].body_html.as_deref().expect("html body missing");
    assert!(html.contains(&format!(
        "{}/handle_verification_click?token={}",
        common::TEST_BASE_URL,
        verification.token
    )));
}

#[tokio::test]
async fn user_without_email_is_skipped_not_retried() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    app.seed_user("u1", User::default()).await;

    let response = trigger_user_created(&app, &client, "u1").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "skipped");
    assert_eq!(body["reason"], "no email address");
    assert_eq!(app.mailbox.send_count(), 0);
}

#[tokio::test]
async fn already_verified_user_is_skipped() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    app.seed_user(
        "u1",
        User {
            verified: true,
            ..user_with_email("a@example.com")
        },
    )
    .await;

    let response = trigger_user_created(&app, &client, "u1").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "skipped");
    assert_eq!(app.mailbox.send_count(), 0);
}

// =============================================================================
// Operation B: verification click
// =============================================================================

#[tokio::test]
async fn valid_token_marks_user_verified_and_is_consumed() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    app.seed_user("u1", user_with_email("a@example.com")).await;
    trigger_user_created(&app, &client, "u1").await;

    let token = app.user("u1").await.verification.expect("token").token;

    let response = client
        .get(format!(
            "{}/handle_verification_click?token={}",
            app.address, token
        ))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let user = app.user("u1").await;
    assert!(user.verified);
    assert!(user.verification.is_none());
}

#[tokio::test]
async fn consumed_token_fails_a_second_validation() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    app.seed_user("u1", user_with_email("a@example.com")).await;
    trigger_user_created(&app, &client, "u1").await;

    let token = app.user("u1").await.verification.expect("token").token;
    let url = format!("{}/handle_verification_click?token={}", app.address, token);

    let first = client.get(&url).send().await.expect("request");
    assert_eq!(first.status(), 200);

    let second = client.get(&url).send().await.expect("request");
    assert_eq!(second.status(), 404);
}

#[tokio::test]
async fn expired_token_is_rejected_distinctly_from_unknown() {
    let app = TestApp::spawn().await;
    let client = Client::new();
    app.seed_user(
        "u1",
        User {
            verification: Some(Verification {
                token: "deadbeef".repeat(8),
                expires_at: Utc::now() - Duration::minutes(5),
            }),
            ..user_with_email("a@example.com")
        },
    )
    .await;

    let response = client
        .get(format!(
            "{}/handle_verification_click?token={}",
            app.address,
            "deadbeef".repeat(8)
        ))
        .send()
        .await
        .expect("Failed to execute request");

    // Expired is a 400, not the 404 an unknown token gets
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("expired"));

    let user = app.user("u1").await;
    assert!(!user.verified);
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/handle_verification_click?token=no-such-token",
            app.address
        ))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn missing_token_is_bad_request() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/handle_verification_click", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}
