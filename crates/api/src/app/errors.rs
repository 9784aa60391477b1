//! Error responses.
//!
//! Every failure leaves the API as `{ "errorMessage": "..." }` with the status
//! carried by [`ApiError`]. Store details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use hubs_core::DomainError;
use hubs_infra::StoreError;

/// Message used whenever a required body field is missing or blank.
pub const EMPTY_FIELD: &str = "Cannot be empty";

/// A terminal error response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error_message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a failed store call to a 500 with a route-specific message.
    pub fn store(err: StoreError, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(error = %err, response = %message, "store call failed");
        Self::internal(message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) => Self::bad_request(EMPTY_FIELD),
            DomainError::InvalidId(msg) => Self::bad_request(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error_message: &self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_status() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_failures_hide_backend_details() {
        let err = ApiError::store(
            StoreError::Backend("relation \"users\" does not exist".to_string()),
            "Cannot",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Cannot");
    }

    #[test]
    fn domain_validation_maps_to_empty_field() {
        let err: ApiError = DomainError::validation("name cannot be empty").into();
        assert_eq!(err, ApiError::bad_request(EMPTY_FIELD));
    }

    #[test]
    fn body_uses_error_message_key() {
        let body = serde_json::to_value(ErrorBody {
            error_message: "Cannot",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "errorMessage": "Cannot" }));
    }

    #[test]
    fn into_response_keeps_status() {
        let response = ApiError::bad_request("Invalid user ID of #7").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
