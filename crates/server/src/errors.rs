use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::errors::ServiceError;

/// Error returned by every handler; rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, body: ErrorBody::new(error, detail) }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", None)
    }

    pub fn not_a_json() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Not a JSON", None)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.body.error, detail = ?self.body.detail, "request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg, None),
            ServiceError::NotFound(_) => Self::not_found(),
            ServiceError::Storage(e) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure", Some(e.to_string()))
            }
        }
    }
}

impl From<ModelError> for JsonApiError {
    fn from(e: ModelError) -> Self {
        ServiceError::from(e).into()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(#[from] service::storage::StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
