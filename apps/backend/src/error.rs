//! JSON error responses: `{ "error": message }`.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use chainfolio_common::error::FolioError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FolioError> for ApiError {
    fn from(e: FolioError) -> Self {
        let status = match &e {
            FolioError::InvalidQuery(_) | FolioError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_are_bad_gateway() {
        let err: ApiError = FolioError::Oracle("HTTP 429".into()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "Price oracle error: HTTP 429");

        let err: ApiError = FolioError::Timeout {
            what: "price fetch".into(),
            after: std::time::Duration::from_secs(10),
        }.into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_query_errors_are_bad_request() {
        let err: ApiError = FolioError::InvalidQuery("unknown sortBy".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_local_errors_are_internal() {
        let err: ApiError = FolioError::Fixture("profile.json".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::bad_request("chainId must be a number").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
