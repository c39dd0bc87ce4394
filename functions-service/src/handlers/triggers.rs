//! Webhook endpoints the platform invokes on Realtime Database creations.
//!
//! Payloads mirror the trigger event shape: the path parameters plus the
//! value written at the node.

use crate::models::{Notification, User};
use crate::services::{NotificationOutcome, VerificationOutcome};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedEvent {
    #[validate(length(min = 1, message = "userId cannot be empty"))]
    pub user_id: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCreatedEvent {
    #[validate(length(min = 1, message = "userId cannot be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "notificationId cannot be empty"))]
    pub notification_id: String,
    pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `/users/{userId}` creation: start the verification flow.
#[tracing::instrument(skip(state, event), fields(user_id = %event.user_id))]
pub async fn user_created(
    State(state): State<AppState>,
    Json(event): Json<UserCreatedEvent>,
) -> Result<(StatusCode, Json<TriggerResponse>), AppError> {
    event.validate()?;

    let outcome = state
        .verification
        .handle_user_created(&event.user_id, &event.user)
        .await?;

    let (status, response) = match outcome {
        VerificationOutcome::EmailSent => (
            StatusCode::ACCEPTED,
            TriggerResponse {
                status: "sent".to_string(),
                reason: None,
            },
        ),
        VerificationOutcome::SkippedAlreadyVerified => (
            StatusCode::OK,
            TriggerResponse {
                status: "skipped".to_string(),
                reason: Some("already verified".to_string()),
            },
        ),
        VerificationOutcome::SkippedNoEmail => (
            StatusCode::OK,
            TriggerResponse {
                status: "skipped".to_string(),
                reason: Some("no email address".to_string()),
            },
        ),
    };

    Ok((status, Json(response)))
}

/// `/notifications/users/{userId}/{notificationId}` creation: format and
/// send the notification email.
#[tracing::instrument(
    skip(state, event),
    fields(user_id = %event.user_id, notification_id = %event.notification_id)
)]
pub async fn notification_created(
    State(state): State<AppState>,
    Json(event): Json<NotificationCreatedEvent>,
) -> Result<(StatusCode, Json<TriggerResponse>), AppError> {
    event.validate()?;

    let outcome = state
        .notifications
        .handle_notification_created(&event.user_id, &event.notification_id, &event.notification)
        .await?;

    let response = TriggerResponse {
        status: "sent".to_string(),
        reason: match outcome {
            NotificationOutcome::DebitAlertSent => None,
            NotificationOutcome::GenericSent => Some("unknown type, generic template".to_string()),
        },
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}
