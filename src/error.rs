//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Version conflict: concurrent modification detected")]
    VersionConflict,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Optimistic concurrency failure that a fresh attempt may get past
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, AppError::Store(err) if err.is_version_conflict())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidHeader(header) => {
                (StatusCode::BAD_REQUEST, "invalid_header", Some(header.clone()))
            }

            // 409 Conflict
            AppError::VersionConflict => {
                (StatusCode::CONFLICT, "version_conflict", None)
            }

            // Domain errors carry their own status
            AppError::Domain(domain_err) => {
                let status = StatusCode::from_u16(domain_err.code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!("Domain failure: {}", domain_err);
                }
                (status, domain_err.error_code(), None)
            }

            AppError::Store(StoreError::VersionConflict { .. } | StoreError::TransactionConflict(_)) => {
                (StatusCode::CONFLICT, "version_conflict", None)
            }
            AppError::Store(StoreError::UniqueViolation(constraint)) => {
                (StatusCode::CONFLICT, "unique_violation", Some(constraint.clone()))
            }

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
        };

        // Infrastructure details stay in the logs
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR && !matches!(self, AppError::Domain(_)) {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_domain_status_codes() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("deposit money to other accounts"), StatusCode::FORBIDDEN),
            (DomainError::AccountNotFound("1000000".into()), StatusCode::NOT_FOUND),
            (DomainError::DuplicateTaxId("123456789".into()), StatusCode::BAD_REQUEST),
            (DomainError::NoAccountTypesConfigured, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_version_conflict_is_409() {
        let err = AppError::from(StoreError::VersionConflict {
            account_id: Uuid::new_v4(),
            expected: 1,
        });
        assert!(err.is_version_conflict());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(AppError::VersionConflict.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_deadlock_is_retryable_409() {
        let err = AppError::from(StoreError::TransactionConflict("40P01".into()));
        assert!(err.is_version_conflict());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_database_error_is_500() {
        let err = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert!(!err.is_version_conflict());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
