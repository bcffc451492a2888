//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request failed validation before reaching a service.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message,
                },
            ),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        (status, Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, ErrorBody) {
    let code = err.code();
    match err {
        DomainError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            ErrorBody {
                code,
                message: err.to_string(),
            },
        ),
        DomainError::Validation(message) => (StatusCode::BAD_REQUEST, ErrorBody { code, message }),
        DomainError::Internal(message) => {
            tracing::error!(error = %message, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { code, message },
            )
        }
        DomainError::Store(store_err) => {
            // Store details stay in the logs.
            tracing::error!(error = %store_err, "store failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code,
                    message: "Internal server error".to_string(),
                },
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
