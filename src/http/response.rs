//! `{success, data}` envelopes and the mapping of failures onto HTTP statuses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::core::services::ServiceError;
use crate::errors::StoreError;

pub type ApiResult = Result<Response, ApiError>;

#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub fn ok<T: Serialize>(data: T) -> ApiResult {
    Ok((
        StatusCode::OK,
        Json(Envelope {
            success: true,
            data,
        }),
    )
        .into_response())
}

pub fn created<T: Serialize>(data: T) -> ApiResult {
    Ok((
        StatusCode::CREATED,
        Json(Envelope {
            success: true,
            data,
        }),
    )
        .into_response())
}

/// Wraps an optional report, answering 404 when there is nothing to report.
pub fn found<T: Serialize>(value: Option<T>, missing: impl FnOnce() -> String) -> ApiResult {
    match value {
        Some(data) => ok(data),
        None => Err(ApiError::NotFound(missing())),
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "Validation failed".to_string(), errors)
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, Vec::new()),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };
        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(problems) => ApiError::Validation(problems),
            ServiceError::NotFound(message) => ApiError::NotFound(message),
            ServiceError::Conflict(message) => ApiError::Validation(vec![message]),
            ServiceError::Store(store) => store.into(),
        }
    }
}

/// Malformed or mistyped request bodies are client errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => ApiError::Validation(vec![err.to_string()]),
            StoreError::Missing { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
