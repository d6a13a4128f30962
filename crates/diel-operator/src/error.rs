//! Error types for the operator API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diel_core::reload::ReloadError;

/// Errors surfaced by operator API handlers.
///
/// Each variant maps to an HTTP status code and a JSON error body when
/// converted into a response.
#[derive(Debug, thiserror::Error)]
pub enum OperatorApiError {
    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller did not present a valid bearer token for a mutating
    /// route.
    #[error("You do not have permission to use this command.")]
    PermissionDenied,

    /// The request body or parameters were rejected.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A world id in the request path could not be parsed.
    #[error("invalid world id '{raw}': {source}")]
    InvalidWorldId {
        /// The raw path segment as received.
        raw: String,
        /// The underlying UUID parse error.
        source: uuid::Error,
    },

    /// A configuration reload failed before any state changed.
    #[error("reload failed: {source}")]
    Reload {
        /// The underlying reload error.
        #[from]
        source: ReloadError,
    },
}

impl IntoResponse for OperatorApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::InvalidRequest(_) | Self::InvalidWorldId { .. } => StatusCode::BAD_REQUEST,
            Self::Reload { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
