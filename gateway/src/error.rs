//! Mapping of ledger failures onto HTTP responses.
//!
//! Each error kind gets its own status code. Error responses never carry a
//! product record.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use supplychain_common::{ErrorKind, LedgerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Malformed request payload: {0}")]
    MalformedRequest(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND`.
    pub code: String,
    pub message: String,
    #[serde(rename = "productID", default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub retryable: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(e) => match e.kind() {
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                ErrorKind::CorruptRecord | ErrorKind::Serialization => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ErrorKind::Store => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            ApiError::MalformedRequest(_) => ErrorDetail {
                code: ErrorKind::InvalidArgument.code().to_string(),
                message: self.to_string(),
                product_id: None,
                retryable: false,
            },
            ApiError::Ledger(e) => {
                let kind = e.kind();
                // Server-side failures are logged in full, not echoed back.
                let message = match kind {
                    ErrorKind::CorruptRecord => "stored record could not be decoded".to_string(),
                    ErrorKind::Serialization => "record could not be encoded".to_string(),
                    ErrorKind::Store => "ledger unavailable, retry the request".to_string(),
                    _ => e.to_string(),
                };
                ErrorDetail {
                    code: kind.code().to_string(),
                    message,
                    product_id: e.id().filter(|id| !id.is_empty()).map(str::to_string),
                    retryable: e.is_retryable(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorBody { error: self.detail() })).into_response()
    }
}
