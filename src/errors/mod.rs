//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::{StoreError, StoreErrorKind};

/// Error detail in the API response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
            || matches!(self, Self::Store(e) if e.kind == StoreErrorKind::NotFound)
    }

    /// Check if this error represents an auth failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Status, machine code and client-facing message for this error.
    /// Store and internal details are logged here and never returned.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidType(t) => (
                StatusCode::BAD_REQUEST,
                "INVALID_TYPE",
                format!("Invalid type '{t}'"),
            ),
            AppError::InvalidAction(a) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ACTION",
                format!("Invalid action '{a}'"),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!(kind = ?e.kind, error = %e.message, "Store error");
                store_error_parts(e)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

/// Map a classified store failure to its HTTP status, code and public message.
fn store_error_parts(e: &StoreError) -> (StatusCode, &'static str, String) {
    match e.kind {
        StoreErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Record not found".to_string(),
        ),
        StoreErrorKind::Connection => (
            StatusCode::SERVICE_UNAVAILABLE,
            "STORE_UNAVAILABLE",
            "The data store is unavailable".to_string(),
        ),
        StoreErrorKind::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "STORE_TIMEOUT",
            "The data store did not respond in time".to_string(),
        ),
        StoreErrorKind::Permission => (
            StatusCode::BAD_GATEWAY,
            "STORE_PERMISSION_DENIED",
            "The data store rejected the request".to_string(),
        ),
        StoreErrorKind::Query => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred".to_string(),
        ),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Store(e.into())
    }
}

impl From<&StoreError> for ApiError {
    fn from(e: &StoreError) -> Self {
        let (_, code, message) = store_error_parts(e);
        ApiError {
            code: code.to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = ApiResponse::<()> {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["data"], "hello");
        assert!(json["error"].is_null());
    }

    #[test]
    fn api_response_error() {
        let response = ApiResponse::<()>::error("NOT_FOUND", "Item not found");
        let json = serde_json::to_value(&response.0).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Item not found");
    }

    #[test]
    fn app_error_is_not_found() {
        let err = AppError::NotFound("tip".to_string());
        assert!(err.is_not_found());
        assert!(!err.is_unauthorized());

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn app_error_display() {
        let err = AppError::Validation("userId is required".to_string());
        assert_eq!(err.to_string(), "Validation error: userId is required");
    }

    #[test]
    fn invalid_type_and_action_are_bad_requests() {
        let resp = AppError::InvalidType("bogus".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = AppError::InvalidAction("bogus".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_are_classified() {
        let cases = [
            (StoreErrorKind::NotFound, StatusCode::NOT_FOUND),
            (StoreErrorKind::Connection, StatusCode::SERVICE_UNAVAILABLE),
            (StoreErrorKind::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (StoreErrorKind::Permission, StatusCode::BAD_GATEWAY),
            (StoreErrorKind::Query, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            let resp = AppError::Store(StoreError::new(kind, "boom")).into_response();
            assert_eq!(resp.status(), status, "{kind:?}");
        }
    }

    #[test]
    fn store_error_envelope_hides_raw_message() {
        let err = StoreError::new(StoreErrorKind::Connection, "password=hunter2 refused");
        let api: ApiError = (&err).into();
        assert_eq!(api.code, "STORE_UNAVAILABLE");
        assert!(!api.message.contains("hunter2"));
    }
}
