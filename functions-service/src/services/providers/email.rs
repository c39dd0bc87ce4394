use super::{EmailMessage, EmailProvider, ProviderError, ProviderResponse};
use crate::config::ResendConfig;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

/// Resend transactional-email provider.
///
/// The HTTP client and the resolved API key are built once and reused for
/// the lifetime of the instance. A missing key does not fail construction;
/// every send then fails fast with a descriptive configuration error.
pub struct ResendProvider {
    config: ResendConfig,
    client: reqwest::Client,
}

impl ResendProvider {
    pub fn new(config: ResendConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "Resend email provider is not enabled".to_string(),
            ));
        }

        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ProviderError::Configuration(
                "RESEND_API_KEY is missing. Mount it as a secret or set the environment variable."
                    .to_string(),
            )
        })?;

        if email.to.is_empty() || email.to.iter().any(|r| r.trim().is_empty()) {
            return Err(ProviderError::InvalidRecipient(
                "Recipient list must be non-empty addresses".to_string(),
            ));
        }

        if email.body_html.is_none() && email.body_text.is_none() {
            return Err(ProviderError::SendFailed(
                "Email must have either text or HTML body".to_string(),
            ));
        }

        let request = ResendRequest {
            from: &email.from,
            to: email.to.iter().map(String::as_str).collect(),
            subject: &email.subject,
            html: email.body_html.as_deref(),
            text: email.body_text.as_deref(),
            reply_to: email.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Connection(format!(
                    "Failed to reach Resend for '{}' to {}: {}",
                    email.subject,
                    email.to.join(", "),
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::SendFailed(format!(
                "Resend returned {} for '{}' to {}: {}",
                status,
                email.subject,
                email.to.join(", "),
                body
            )));
        }

        let parsed: ResendResponse = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse Resend response: {}", e))
        })?;

        tracing::info!(
            to = %email.to.join(", "),
            subject = %email.subject,
            provider_id = %parsed.id,
            "Email sent successfully"
        );

        Ok(ProviderResponse::success(Some(parsed.id)))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.config.api_key.is_none() {
            return Err(ProviderError::Configuration(
                "RESEND_API_KEY is missing".to_string(),
            ));
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock email provider for testing. Retains sent messages for inspection.
pub struct MockEmailProvider {
    enabled: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mock mailbox poisoned").clone()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock email provider is not enabled".to_string(),
            ));
        }

        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent
            .lock()
            .expect("mock mailbox poisoned")
            .push(email.clone());

        tracing::info!(
            to = %email.to.join(", "),
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(ProviderResponse::success(Some(format!(
            "mock-email-{}",
            count
        ))))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(enabled: bool, key: Option<&str>) -> ResendConfig {
        ResendConfig {
            api_key: key.map(|k| SecretString::new(k.to_string())),
            from_onboarding: "Onboarding <onboarding@example.com>".to_string(),
            from_alerts: "Alerts <alerts@example.com>".to_string(),
            from_info: "Info <info@example.com>".to_string(),
            enabled,
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            from: "Alerts <alerts@example.com>".to_string(),
            to: vec!["user@example.com".to_string()],
            subject: "hi".to_string(),
            body_html: Some("<strong>hello</strong>".to_string()),
            body_text: None,
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_with_descriptive_error() {
        let provider = ResendProvider::new(config(true, None)).expect("provider");
        let err = provider.send(&message()).await.unwrap_err();
        match err {
            ProviderError::Configuration(msg) => assert!(msg.contains("RESEND_API_KEY")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn disabled_provider_reports_not_enabled() {
        let provider = ResendProvider::new(config(false, Some("re_test"))).expect("provider");
        let err = provider.send(&message()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotEnabled(_)));
    }

    #[tokio::test]
    async fn mock_provider_records_messages() {
        let mock = MockEmailProvider::new(true);
        mock.send(&message()).await.expect("send");
        mock.send(&message()).await.expect("send");

        assert_eq!(mock.send_count(), 2);
        let sent = mock.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["user@example.com"]);
    }

    #[tokio::test]
    async fn empty_recipient_list_is_rejected() {
        let provider = ResendProvider::new(config(true, Some("re_test"))).expect("provider");
        let mut email = message();
        email.to.clear();

        let err = provider.send(&email).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRecipient(_)));
    }
}
