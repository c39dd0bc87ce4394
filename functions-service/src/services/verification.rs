use crate::config::VerificationConfig;
use crate::models::{User, Verification};
use crate::services::metrics::record_email;
use crate::services::templates;
use crate::services::{EmailMessage, EmailProvider, ServiceError, UserStore};
use rand::Rng;
use std::sync::Arc;

const CALLBACK_PATH: &str = "handle_verification_click";

/// What happened to a user-created event. Skips are terminal: the platform
/// must not retry them.
#[derive(Debug, PartialEq)]
pub enum VerificationOutcome {
    EmailSent,
    SkippedAlreadyVerified,
    SkippedNoEmail,
}

#[derive(Clone)]
pub struct VerificationService {
    store: Arc<dyn UserStore>,
    email: Arc<dyn EmailProvider>,
    config: VerificationConfig,
    from: String,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn UserStore>,
        email: Arc<dyn EmailProvider>,
        config: VerificationConfig,
        from: String,
    ) -> Self {
        Self {
            store,
            email,
            config,
            from,
        }
    }

    /// Trigger A: a user record was created. Issue a token, persist it under
    /// the verification sub-record, and mail the verification link.
    pub async fn handle_user_created(
        &self,
        user_id: &str,
        user: &User,
    ) -> Result<VerificationOutcome, ServiceError> {
        if user.verified {
            tracing::info!(user_id = %user_id, "User already verified, skipping");
            return Ok(VerificationOutcome::SkippedAlreadyVerified);
        }

        let Some(email) = user.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            tracing::warn!(user_id = %user_id, "User has no email field, skipping verification");
            return Ok(VerificationOutcome::SkippedNoEmail);
        };

        let token = generate_random_token();
        let verification = Verification::new(token.clone(), self.config.ttl_hours);
        self.store.put_verification(user_id, &verification).await?;

        let verification_url = build_verification_url(&self.config.base_url, &token);
        let (html, text) = templates::verification_email(&verification_url, self.config.ttl_hours);

        let message = EmailMessage {
            from: self.from.clone(),
            to: vec![email.to_string()],
            subject: "Welcome! Please Verify Your Email".to_string(),
            body_html: Some(html),
            body_text: Some(text),
            reply_to: None,
        };

        // A failed send propagates so the platform can retry the trigger.
        let response = self.email.send(&message).await.inspect_err(|_| {
            record_email("verification", "failed");
        })?;
        record_email("verification", "sent");

        tracing::info!(
            user_id = %user_id,
            to = %email,
            provider_id = ?response.provider_id,
            "Verification email sent"
        );

        Ok(VerificationOutcome::EmailSent)
    }

    /// Operation B: the verification link was clicked. Consumes the token.
    pub async fn verify_click(&self, token: &str) -> Result<String, ServiceError> {
        let (user_id, user) = match self.store.find_by_verification_token(token).await {
            Ok(Some(found)) => found,
            Ok(None) => return Err(ServiceError::InvalidToken),
            Err(crate::services::database::StoreError::TokenCollision(n)) => {
                tracing::error!(matches = n, "Verification token collision detected");
                return Err(ServiceError::TokenCollision);
            }
            Err(e) => return Err(ServiceError::Database(e)),
        };

        let verification = user.verification.as_ref().ok_or(ServiceError::InvalidToken)?;
        if verification.is_expired() {
            tracing::info!(user_id = %user_id, "Verification token expired");
            return Err(ServiceError::TokenExpired);
        }

        // Sets `verified` and clears the sub-record together, so the token
        // can never validate a second time.
        self.store.mark_verified(&user_id).await?;

        tracing::info!(user_id = %user_id, "User successfully verified");
        Ok(user_id)
    }
}

fn generate_random_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    hex::encode(token_bytes)
}

/// Build the callback link. When the base URL already points directly at the
/// deployed function (a run.app host, or it ends with the callback path), the
/// path is not appended again.
fn build_verification_url(base_url: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let lower = base.to_lowercase();
    if lower.ends_with(&format!("/{}", CALLBACK_PATH)) || lower.contains("run.app") {
        format!("{}?token={}", base, token)
    } else {
        format!("{}/{}?token={}", base, CALLBACK_PATH, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_64_hex_chars_and_unique() {
        let a = generate_random_token();
        let b = generate_random_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn url_appends_callback_path_to_plain_base() {
        assert_eq!(
            build_verification_url("https://functions.example.com", "abc"),
            "https://functions.example.com/handle_verification_click?token=abc"
        );
        // Trailing slash is trimmed first
        assert_eq!(
            build_verification_url("https://functions.example.com/", "abc"),
            "https://functions.example.com/handle_verification_click?token=abc"
        );
    }

    #[test]
    fn url_does_not_double_append_the_path() {
        assert_eq!(
            build_verification_url("https://x.example/handle_verification_click", "abc"),
            "https://x.example/handle_verification_click?token=abc"
        );
        assert_eq!(
            build_verification_url("https://handle-verification-click-xyz-uc.a.run.app", "abc"),
            "https://handle-verification-click-xyz-uc.a.run.app?token=abc"
        );
    }
}
