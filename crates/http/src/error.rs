//! Error handling for the bookshelf HTTP layer

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::response::write_json;

/// Body of a 422 response: `{"errors": {field: message}}`
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub errors: BTreeMap<String, String>,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {} field(s) rejected", errors.len())]
    Validation { errors: BTreeMap<String, String> },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error from `(field, message)` pairs
    pub fn validation<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Validation {
            errors: errors
                .into_iter()
                .map(|(field, message)| (field.into(), message.into()))
                .collect(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::Validation { errors } => {
                tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "request rejected by validation");
                write_json(status, &ValidationBody { errors })
            }
            AppError::Internal(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = ?e,
                    "request failed"
                );
                status_text(status)
            }
            other => {
                tracing::debug!(status_code = %status.as_u16(), error = %other, "request error");
                status_text(status)
            }
        }
    }
}

/// Bare status response; internal details never reach the client.
fn status_text(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}
