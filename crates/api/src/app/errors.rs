use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use shopwise_client::RedirectError;
use shopwise_core::DomainError;
use shopwise_infra::RepositoryError;

/// Errors surfaced by JSON handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RedirectError> for ApiError {
    fn from(err: RedirectError) -> Self {
        match err {
            RedirectError::NotFound(_) => ApiError::NotFound,
            RedirectError::Unavailable(msg) => ApiError::Unavailable(msg),
            RedirectError::InvalidDestination(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Domain(DomainError::NotFound) => {
                json_error(StatusCode::NOT_FOUND, "not_found", "not found")
            }
            ApiError::Domain(DomainError::InvalidId(msg)) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
            }
            ApiError::Domain(DomainError::Validation(msg)) => {
                json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
            }
            ApiError::Repository(e) => {
                tracing::error!(error = %e, "repository failure");
                json_error(StatusCode::SERVICE_UNAVAILABLE, "store_error", "catalog store unavailable")
            }
            ApiError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "dependency unavailable");
                json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", "service unavailable")
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
