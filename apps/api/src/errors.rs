use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Duplicate application")]
    DuplicateApplication,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("No file part")]
    NoFilePart,

    #[error("Empty filename")]
    EmptyFilename,

    #[error("Disallowed file extension")]
    DisallowedExtension,

    #[error("Search unavailable")]
    SearchUnavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingFields(msg) => (
                StatusCode::BAD_REQUEST,
                "MISSING_FIELDS",
                format!("Missing required fields: {msg}"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_EMAIL",
                "Email already registered".to_string(),
            ),
            AppError::DuplicateApplication => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_APPLICATION",
                "You have already applied for this job".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::NoFilePart => (
                StatusCode::BAD_REQUEST,
                "NO_FILE_PART",
                "No file part".to_string(),
            ),
            AppError::EmptyFilename => (
                StatusCode::BAD_REQUEST,
                "EMPTY_FILENAME",
                "No selected file".to_string(),
            ),
            AppError::DisallowedExtension => (
                StatusCode::BAD_REQUEST,
                "DISALLOWED_EXTENSION",
                "File type not allowed".to_string(),
            ),
            AppError::SearchUnavailable => (
                StatusCode::BAD_GATEWAY,
                "SEARCH_UNAVAILABLE",
                "Failed to fetch job listings".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
