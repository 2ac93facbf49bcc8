//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Authentication required: missing {0} header")]
    AuthenticationRequired(String),

    #[error("Method \"{0}\" not allowed")]
    MethodNotAllowed(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Media storage error: {0}")]
    Media(#[from] crate::media::MediaError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Shorthand for the most common domain failure
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::Domain(DomainError::not_found(entity, id))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                Some(serde_json::Value::String(msg.clone())),
            ),

            // 401 Unauthorized
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key", None),
            AppError::AuthenticationRequired(_) => {
                (StatusCode::UNAUTHORIZED, "authentication_required", None)
            }

            // 405 Method Not Allowed
            AppError::MethodNotAllowed(_) => {
                (StatusCode::METHOD_NOT_ALLOWED, "invalid_operation", None)
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => {
                let status = match domain_err {
                    DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                    DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                    DomainError::Conflict(_) => StatusCode::CONFLICT,
                    DomainError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
                    DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                };
                let details = match domain_err {
                    DomainError::Validation {
                        ingredient_id: Some(id),
                        ..
                    } => Some(serde_json::json!({ "ingredient_id": id })),
                    _ => None,
                };
                (status, domain_err.kind(), details)
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Media(e) => {
                tracing::error!("Media storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "media_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_domain_error_statuses() {
        assert_eq!(
            status_of(DomainError::validation("empty ingredients").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::not_found("Recipe", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Conflict("already favorited".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::InvalidOperation("self follow".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Forbidden("not the author".into()).into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_transport_error_statuses() {
        assert_eq!(
            status_of(AppError::AuthenticationRequired("X-Request-User-Id".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::MethodNotAllowed("PUT".into())),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
