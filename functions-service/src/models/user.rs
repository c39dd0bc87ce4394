use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A user record as stored at `/users/{userId}`.
///
/// The record is created by the external signup process; this service only
/// manages the `verified` flag and the `verification` sub-record. Field names
/// follow the stored JSON layout (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

impl User {
    /// First name used in email greetings.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Customer")
    }
}

/// The `verification` sub-record: one pending email-verification token.
///
/// Written once when the user is created, cleared exactly once when the
/// token is consumed, or left to expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Verification {
    pub fn new(token: String, ttl_hours: i64) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::hours(ttl_hours),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_expiry_is_in_the_future() {
        let v = Verification::new("abc".to_string(), 1);
        assert!(!v.is_expired());
        assert!(v.expires_at > Utc::now());
    }

    #[test]
    fn verification_with_past_expiry_is_expired() {
        let v = Verification {
            token: "abc".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        };
        assert!(v.is_expired());
    }

    #[test]
    fn user_deserializes_from_stored_layout() {
        let user: User = serde_json::from_value(serde_json::json!({
            "email": "a@example.com",
            "accountBalance": 25000.0,
            "accountNumber": "0123456789",
            "bankName": "Finsync",
        }))
        .expect("Failed to deserialize user");

        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.account_number.as_deref(), Some("0123456789"));
        assert!(!user.verified);
        assert!(user.verification.is_none());
        assert_eq!(user.display_name(), "Customer");
    }
}
