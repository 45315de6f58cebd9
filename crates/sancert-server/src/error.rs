//! HTTP error mapping.
//!
//! Every failure leaves the service as `{"detail": "<message>"}` with one of
//! four statuses: 401 for authentication, 404 for empty device lookups, 422
//! for malformed query parameters, and 500 for everything else (upstream
//! text or the error message surfaced).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// A backend call failed or returned a non-success status.
    #[error(transparent)]
    Upstream(#[from] BackendError),

    #[error(transparent)]
    Internal(#[from] sancert_core::Error),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            error!(error = %detail, "request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
