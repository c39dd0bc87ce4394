mod common;

use common::TestApp;
use reqwest::Client;
use serde_json::json;

#[tokio::test]
async fn informative_email_goes_to_a_single_recipient() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/send_informative", app.address))
        .json(&json!({
            "subject": "Scheduled maintenance",
            "body": "We will be offline on Sunday.",
            "to": "a@example.com",
            "name": "Ada"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 202);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ok"], true);
    assert_eq!(body["to"], json!(["a@example.com"]));

    let sent = app.mailbox.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Scheduled maintenance");
    let html = sent[0].body_html.as_deref().expect("html body missing");
    assert!(html.contains("We will be offline on Sunday."));
    assert!(html.contains("Hi Ada,"));
}

#[tokio::test]
async fn recipient_list_goes_out_in_one_send() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/send_informative", app.address))
        .json(&json!({
            "subject": "Hello",
            "body": "Notice",
            "to": ["a@example.com", "b@example.com"]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 202);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["to"], json!(["a@example.com", "b@example.com"]));
    assert!(body["provider_id"].is_string());

    // One provider call covers every recipient; a failure delivers to no one.
    assert_eq!(app.mailbox.send_count(), 1);
    let sent = app.mailbox.sent_messages();
    assert_eq!(sent[0].to, vec!["a@example.com", "b@example.com"]);
}

#[tokio::test]
async fn sent_emails_show_up_in_the_metrics_endpoint() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/send_informative", app.address))
        .json(&json!({
            "subject": "Hello",
            "body": "Notice",
            "to": "a@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 202);

    let metrics = client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .expect("Failed to read metrics body");

    assert!(
        metrics.contains("functions_email_total"),
        "email counter missing from metrics output: {}",
        metrics
    );
}

#[tokio::test]
async fn empty_subject_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/send_informative", app.address))
        .json(&json!({
            "subject": "",
            "body": "Notice",
            "to": "a@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 422);
    assert_eq!(app.mailbox.send_count(), 0);
}

#[tokio::test]
async fn get_is_not_allowed() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/send_informative", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 405);
}
