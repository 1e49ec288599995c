//! # API Errors
//!
//! Every failure maps to exactly one HTTP status and a JSON body of the
//! form `{"error": <message>, "code": <status>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::query::QueryError;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Dispatcher
    // ==================
    #[error("server is not writable")]
    NotWritable,

    #[error("content type must be application/json")]
    NotAcceptable,

    #[error("not found: {0}")]
    NotFound(String),

    // ==================
    // Layers below
    // ==================
    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotWritable => StatusCode::FORBIDDEN,
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,

            ApiError::Query(_) => StatusCode::BAD_REQUEST,

            ApiError::Store(err) => match err {
                StoreError::UnknownColumn(_) | StoreError::MalformedPayload(_) => {
                    StatusCode::BAD_REQUEST
                }
                StoreError::DuplicateKey { .. } => StatusCode::CONFLICT,
                StoreError::NotFound { .. } => StatusCode::GONE,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },

            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotWritable => "TLEDB_NOT_WRITABLE",
            ApiError::NotAcceptable => "TLEDB_NOT_ACCEPTABLE",
            ApiError::NotFound(_) => "TLEDB_NO_ROUTE",
            ApiError::Query(err) => err.code(),
            ApiError::Store(err) => err.code(),
            ApiError::Internal(_) => "TLEDB_INTERNAL",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotWritable.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotAcceptable.status_code(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            ApiError::from(QueryError::UnknownOperator("like".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::DuplicateKey {
                norad_catalog: 25544,
                intldes: "98067A".into()
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound {
                catalog: "norad_catalog",
                id: "1".into()
            })
            .status_code(),
            StatusCode::GONE
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable("locked".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_body() {
        let body = ErrorResponse::from(ApiError::NotWritable);
        assert_eq!(body.code, 403);
        assert_eq!(body.error, "server is not writable");
    }

    #[test]
    fn test_codes_pass_through() {
        let err = ApiError::from(QueryError::UnknownColumn("foo".into()));
        assert_eq!(err.code(), "TLEDB_UNKNOWN_COLUMN");
    }
}
