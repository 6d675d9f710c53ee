//! Error types for the paper comparator server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use paper_insights::{ComparisonError, ErrorKind};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// A comparison that failed validation or ended early
    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    /// The multipart body itself could not be read
    #[error("{message}")]
    InvalidRequest { status: StatusCode, message: String },
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::InvalidRequest {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::Comparison(err) => {
                let (status, code) = match err.kind() {
                    ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    ErrorKind::Extraction => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR")
                    }
                    ErrorKind::RemoteCall => (StatusCode::BAD_GATEWAY, "REMOTE_CALL_ERROR"),
                    ErrorKind::Rendering => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "RENDERING_ERROR")
                    }
                };
                if err.kind() == ErrorKind::Validation {
                    warn!("Comparison rejected: {}", err);
                } else {
                    error!("Comparison failed ({:?}): {}", err.kind(), err);
                }
                (status, code, err.user_message())
            }
            ServerError::InvalidRequest { status, message } => {
                warn!("Unreadable comparison form ({}): {}", status, message);
                let code = if *status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "INVALID_REQUEST"
                };
                (*status, code, format!("Error: {}", message))
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
