use crate::services::metrics::record_email;
use crate::services::{templates, EmailMessage};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Recipients accept either a single address or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        match self {
            Recipients::One(addr) => vec![addr],
            Recipients::Many(addrs) => addrs,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendInformativeRequest {
    #[validate(length(min = 1, message = "Subject cannot be empty"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body cannot be empty"))]
    pub body: String,
    pub to: Recipients,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendInformativeResponse {
    pub ok: bool,
    pub to: Vec<String>,
    pub subject: String,
    pub provider_id: Option<String>,
}

/// HTTP endpoint to send an informative email in the project's design
/// language. The whole recipient list goes out in one provider call, so a
/// failed request means no recipient received the email.
#[tracing::instrument(skip(state, request))]
pub async fn send_informative(
    State(state): State<AppState>,
    Json(request): Json<SendInformativeRequest>,
) -> Result<(StatusCode, Json<SendInformativeResponse>), AppError> {
    request.validate()?;

    let recipients = request.to.clone().into_vec();
    if recipients.is_empty() || recipients.iter().any(|r| r.trim().is_empty()) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "'to' must be a non-empty address or list of addresses"
        )));
    }

    let logo_url = request
        .logo_url
        .clone()
        .unwrap_or_else(|| state.config.branding.logo_url.clone());
    let name = request.name.as_deref().unwrap_or("Customer");
    let html = templates::render_informative(&request.subject, &request.body, name, &logo_url);
    let from = request
        .from
        .clone()
        .unwrap_or_else(|| state.config.resend.from_info.clone());

    let message = EmailMessage {
        from,
        to: recipients.clone(),
        subject: request.subject.clone(),
        body_html: Some(html),
        body_text: None,
        reply_to: request.reply_to.clone(),
    };

    let response = state.email_provider.send(&message).await.map_err(|e| {
        record_email("informative", "failed");
        AppError::EmailError(e.to_string())
    })?;
    record_email("informative", "sent");

    Ok((
        StatusCode::ACCEPTED,
        Json(SendInformativeResponse {
            ok: true,
            to: recipients,
            subject: request.subject,
            provider_id: response.provider_id,
        }),
    ))
}
