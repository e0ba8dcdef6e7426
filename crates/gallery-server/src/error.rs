use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use domain::DomainError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by HTTP handlers, rendered as `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Item not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Malformed form data: {message}")]
    Form { status: StatusCode, message: String },

    /// Storage failures carry only a generic message. Details go to the log.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps a domain error, using `failure` as the public message for
    /// storage faults.
    pub fn from_domain(err: DomainError, failure: &'static str) -> Self {
        match err {
            DomainError::ItemNotFound(_) => ApiError::NotFound,
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
            DomainError::DuplicateId(id) => ApiError::Conflict(format!("Item {id} already exists")),
            DomainError::Storage(detail) => {
                error!(detail = %detail, "{}", failure);
                ApiError::Internal(failure)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Form { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Form {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

/// A request that is not multipart at all (wrong or missing content type).
impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Form {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}
