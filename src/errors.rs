use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::metadata::MetadataError;
use crate::storage::StorageError;

/// Errors surfaced by the HTTP handlers.
///
/// Every variant renders as `{"error": "<message>"}`; the status comes from
/// [`ApiError::status_code`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid client input.
    #[error("{0}")]
    Validation(String),
    /// The object store rejected or failed the write.
    #[error("{0}")]
    Upload(String),
    /// The metadata store failed a read or write.
    #[error("{0}")]
    Persistence(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(_) | ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidContentType(_) => ApiError::Validation(err.to_string()),
            _ => ApiError::Upload(err.to_string()),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Validation(err.body_text())
    }
}
