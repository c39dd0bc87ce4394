use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Notification type discriminator.
///
/// Only debit alerts have a dedicated template; anything else falls back to
/// the generic informative template (the unknown type is kept for logging).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    DebitAlert,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::DebitAlert => write!(f, "DEBIT_ALERT"),
            NotificationKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A notification record as written at
/// `/notifications/users/{userId}/{notificationId}`.
///
/// Created by the external transaction processor; read-only to this service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub data: NotificationData,
}

/// Type-specific payload nested under `data`. Every field is optional; the
/// pipeline coalesces against the user record before rendering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}
