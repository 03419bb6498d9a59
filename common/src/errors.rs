//! Application error types.
//!
//! A single error enum is shared by the API clients, the view-models and the
//! webapp handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::response::ApiResponse;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Error payload rendered by the backend on failed requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP status reported by the backend.
    #[serde(default)]
    pub status: Option<u16>,
    /// Human-readable error message.
    #[serde(default)]
    pub message: String,
    /// Request path that failed.
    #[serde(default)]
    pub path: Option<String>,
    /// Time of the failure, kept as sent (epoch millis or ISO string).
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Creates an error body carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            path: None,
            timestamp: None,
        }
    }
}

/// Errors raised while talking to the backend or serving views.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("backend responded with status {status}: {}", backend_message(.body))]
    Backend { status: u16, body: Option<ErrorBody> },

    /// The backend answered 2xx but the payload could not be decoded.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// Local validation rejected the input before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested view resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn backend_message(body: &Option<ErrorBody>) -> &str {
    body.as_ref()
        .map(|b| b.message.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or("request failed")
}

impl AppError {
    /// Returns the message a view should display for this error.
    ///
    /// Backend failures surface the server-provided message when there is one.
    pub fn display_message(&self) -> String {
        match self {
            AppError::Backend { body, .. } => backend_message(body).to_string(),
            other => other.to_string(),
        }
    }

    /// Returns the server-provided error payload, if any.
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            AppError::Backend { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Stable error code for client handling.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Backend { .. } => "BACKEND_ERROR",
            AppError::InvalidResponse(_) => "INVALID_RESPONSE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status used when the error is rendered by the webapp.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Backend { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }

        let body = ApiResponse::err(self.code(), self.display_message());
        (status, Json(body)).into_response()
    }
}
