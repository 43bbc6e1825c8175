//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upload::UploadError;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The remote storage provider rejected or failed the upload.
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<interviewer_config::ConfigError> for ServerError {
    fn from(e: interviewer_config::ConfigError) -> Self {
        ServerError::Config(e.to_string())
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub error: String,
}

impl ServerError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded")
            }
            ServerError::Upload(_) => (StatusCode::BAD_GATEWAY, "upload_failed"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
            }
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        }
    }

    /// Message shown to the client, without the variant prefix.
    fn client_message(&self) -> String {
        match self {
            ServerError::NotFound(msg)
            | ServerError::BadRequest(msg)
            | ServerError::Internal(msg)
            | ServerError::Config(msg) => msg.clone(),
            ServerError::Upload(_) => "Failed to upload recording to storage".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %detail, "Server error");
        } else {
            tracing::warn!(status = %status, code, error = %detail, "Client error");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}
