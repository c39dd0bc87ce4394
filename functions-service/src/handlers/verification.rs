use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub token: Option<String>,
}

/// The verification link target. Consumes the token and marks the user
/// verified; 404 for an unknown token, 400 for an expired one.
#[tracing::instrument(skip(state, params))]
pub async fn handle_verification_click(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Response, AppError> {
    let token = params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid request: Token is missing")))?;

    state.verification.verify_click(&token).await?;

    match &state.config.verification.success_url {
        Some(url) => Ok(Redirect::to(url).into_response()),
        None => Ok(Html(
            "<h1>Email verified</h1><p>Your email has been verified successfully. You can close this page.</p>",
        )
        .into_response()),
    }
}
