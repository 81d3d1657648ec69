use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::providers::ProviderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Limit reached. Upgrade to continue.")]
    LimitReached,

    #[error("This feature is for premium users only.")]
    PlanDenied,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Text extraction failed: {0}")]
    Extraction(ProviderError),

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::LimitReached | AppError::PlanDenied => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Provider(_)
            | AppError::Extraction(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            AppError::Provider(ref e) => {
                tracing::error!("Provider error: {}", e);
                "Failed to generate content".to_string()
            }
            AppError::Extraction(ref e) => {
                tracing::error!("Text extraction error: {}", e);
                "Failed to extract text from PDF.".to_string()
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Auth(msg) | AppError::Validation(msg) => msg,
            AppError::NotFound => "Creation not found".to_string(),
            AppError::LimitReached => "Limit reached. Upgrade to continue.".to_string(),
            AppError::PlanDenied => "This feature is for premium users only.".to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        AppError::Validation(format!("Failed to parse multipart data: {}", error))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_errors_are_forbidden() {
        assert_eq!(AppError::LimitReached.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::PlanDenied.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_provider_errors_are_server_errors() {
        let error = AppError::from(ProviderError::Timeout);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unreadable_document_is_a_server_error() {
        let error = AppError::Extraction(ProviderError::invalid_input("pdf", "bad xref"));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let error = AppError::Validation("Prompt is required".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }
}
