use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    response::ApiResponse,
    users::{
        password::CredentialError,
        store::{StoreError, UniqueField},
        validation::{ValidationError, EMAIL_TAKEN_MSG, USERNAME_TAKEN_MSG},
    },
};

pub const INTERNAL_MSG: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot delete your own account")]
    SelfDeletionForbidden,

    #[error("User not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Access denied")]
    Forbidden,

    #[error("storage unavailable")]
    StorageUnavailable(#[source] StoreError),

    #[error("corrupt credential: {0}")]
    CorruptCredential(String),

    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(UniqueField::Username) => {
                AppError::Validation(ValidationError::single("username", USERNAME_TAKEN_MSG))
            }
            StoreError::Duplicate(UniqueField::Email) => {
                AppError::Validation(ValidationError::single("email", EMAIL_TAKEN_MSG))
            }
            e @ StoreError::Unavailable(_) => AppError::StorageUnavailable(e),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::Corrupt(detail) => AppError::CorruptCredential(detail),
            e @ CredentialError::Hash(_) => AppError::Internal(e.into()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.into())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::SelfDeletionForbidden => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::StorageUnavailable(_)
            | AppError::CorruptCredential(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text. Server faults collapse to [`INTERNAL_MSG`].
    pub fn user_message(&self) -> String {
        match self {
            AppError::StorageUnavailable(_)
            | AppError::CorruptCredential(_)
            | AppError::Internal(_) => INTERNAL_MSG.to_string(),
            AppError::Validation(v) => v.message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        } else {
            debug!(%status, reason = %self, "request rejected");
        }
        (status, Json(ApiResponse::failure(self.user_message()))).into_response()
    }
}
