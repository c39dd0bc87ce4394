use crate::services::database::StoreError;
use crate::services::providers::ProviderError;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Verification token matched more than one user")]
    TokenCollision,

    #[error("User not found")]
    UserNotFound,

    #[error("User has no email address")]
    MissingEmail,

    #[error("Email error: {0}")]
    Email(#[from] ProviderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::InvalidToken => {
                AppError::NotFound(anyhow::anyhow!("Invalid or expired verification link"))
            }
            ServiceError::TokenExpired => {
                AppError::BadRequest(anyhow::anyhow!("Verification link has expired"))
            }
            ServiceError::TokenCollision => AppError::InternalError(anyhow::anyhow!(
                "Verification token matched more than one user"
            )),
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::MissingEmail => {
                AppError::BadRequest(anyhow::anyhow!("User has no email address"))
            }
            ServiceError::Email(e) => AppError::EmailError(e.to_string()),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
