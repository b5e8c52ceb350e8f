use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Maximum accepted image size, shared by the upload service and error mapping.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const FILE_TOO_LARGE: &str = "File too large. Maximum size is 5MB.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::services::upload_service::StorageError),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    InternalError,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationFailed | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Storage(_)
            | AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::AuthenticationFailed => "Unauthorized".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::ServiceUnavailable(msg) => msg,
            AppError::Storage(e) => {
                tracing::error!("Image storage failed: {}", e);
                "Failed to upload file".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                "Internal server error".to_string()
            }
            AppError::InternalError => "Internal server error".to_string(),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::Validation(FILE_TOO_LARGE.to_string())
        } else {
            AppError::Validation(err.body_text())
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        tracing::error!("Session error: {}", err);
        AppError::InternalError
    }
}
