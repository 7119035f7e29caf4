//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use log::error;
use researcher_rs_core::CoreError;
use researcher_rs_store::StoreError;
use serde::Serialize;
use std::io;
use thiserror::Error;

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    /// RFC 3339 time the error was produced.
    pub timestamp: String,
}

/// An error rendered as `{error, detail, timestamp}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Validation error",
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "Not found",
            detail: detail.into(),
        }
    }

    pub fn method_not_allowed(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            error: "Method not allowed",
            detail: detail.into(),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: "Service unavailable",
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Internal server error",
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(detail) => Self::bad_request(detail),
            CoreError::Store(
                err @ (StoreError::Unavailable(_) | StoreError::AllocationExhausted { .. }),
            ) => Self::unavailable(err.to_string()),
            CoreError::Store(err) => Self::internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                "request failed (status={}, detail={})",
                self.status.as_u16(),
                self.detail
            );
        }
        let body = ErrorBody {
            error: self.error.to_string(),
            detail: self.detail,
            timestamp: Utc::now().to_rfc3339(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failures starting or running the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server stopped unexpectedly: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn store_failures_map_to_service_unavailable() {
        let exhausted = ApiError::from(CoreError::Store(StoreError::AllocationExhausted {
            attempts: 50,
        }));
        assert_eq!(exhausted.status(), StatusCode::SERVICE_UNAVAILABLE);

        let down = ApiError::from(CoreError::Store(StoreError::Unavailable("locked".into())));
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);

        let corrupt = ApiError::from(CoreError::Store(StoreError::Corrupt("bad row".into())));
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::from(CoreError::Validation("query must not be empty".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
