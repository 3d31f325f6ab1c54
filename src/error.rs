//! Application error type and its HTTP representation.
//!
//! Every core operation returns [`AppError`]. The variants keep resolution failures
//! (`NotFound`, `Expired`) and allocation failures (`AlreadyTaken`,
//! `AllocationExhausted`) distinct so the HTTP layer can choose different status codes.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload returned to API clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Expired { message: String, details: Value },

    #[error("{message}")]
    AlreadyTaken { message: String, details: Value },

    #[error("{message}")]
    AllocationExhausted { message: String, details: Value },

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn expired(message: impl Into<String>, details: Value) -> Self {
        Self::Expired {
            message: message.into(),
            details,
        }
    }

    pub fn already_taken(message: impl Into<String>, details: Value) -> Self {
        Self::AlreadyTaken {
            message: message.into(),
            details,
        }
    }

    pub fn allocation_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::AllocationExhausted {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Expired { .. } => (StatusCode::GONE, "expired"),
            AppError::AlreadyTaken { .. } => (StatusCode::CONFLICT, "already_taken"),
            AppError::AllocationExhausted { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "allocation_exhausted")
            }
            AppError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Builds the client-facing payload for this error.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let details = match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Expired { details, .. }
            | AppError::AlreadyTaken { details, .. }
            | AppError::AllocationExhausted { details, .. }
            | AppError::Internal { details, .. } => details.clone(),
            AppError::RateLimited { retry_after_secs } => {
                json!({ "retry_after_secs": retry_after_secs })
            }
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after_secs } = self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(&e).unwrap_or_else(|_| json!({})),
        )
    }
}

/// Maps a database error, surfacing unique violations as [`AppError::AlreadyTaken`].
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::already_taken(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    tracing::error!("Database error: {}", e);
    AppError::internal("Database error", json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::bad_request("x", json!({})), StatusCode::BAD_REQUEST),
            (AppError::not_found("x", json!({})), StatusCode::NOT_FOUND),
            (AppError::expired("x", json!({})), StatusCode::GONE),
            (AppError::already_taken("x", json!({})), StatusCode::CONFLICT),
            (
                AppError::allocation_exhausted("x", json!({})),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::RateLimited {
                    retry_after_secs: 60,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AppError::internal("x", json!({})),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited {
            retry_after_secs: 60,
        }
        .into_response();

        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }

    #[test]
    fn test_error_info_carries_details() {
        let info = AppError::expired("Short link has expired", json!({ "code": "abc" }))
            .to_error_info();

        assert_eq!(info.code, "expired");
        assert_eq!(info.message, "Short link has expired");
        assert_eq!(info.details["code"], "abc");
    }

    #[test]
    fn test_row_not_found_is_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
