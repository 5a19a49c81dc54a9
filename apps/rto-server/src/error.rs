//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rto_protocol::{ErrorBody, error_codes};
use rto_store::StoreError;

use crate::services::export::ExportError;

const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upload or role validation failed.
    #[error(transparent)]
    Validation(#[from] entities::ValidationError),

    /// Wrong email or password.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// No bearer token was sent.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The bearer token is malformed, forged or expired.
    #[error("Invalid token")]
    InvalidToken,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request clashes with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Building a report failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, msg.clone())
            }
            ServerError::Validation(e) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_REQUEST, e.to_string())
            }
            ServerError::InvalidCredentials(msg) => {
                (StatusCode::UNAUTHORIZED, error_codes::INVALID_CREDENTIALS, msg.clone())
            }
            ServerError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTHENTICATION_REQUIRED,
                "Authentication required.".to_string(),
            ),
            ServerError::InvalidToken => (
                StatusCode::FORBIDDEN,
                error_codes::INVALID_TOKEN,
                "Invalid or expired token.".to_string(),
            ),
            ServerError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED, msg.clone())
            }
            ServerError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, error_codes::RESOURCE_NOT_FOUND, msg.clone())
            }
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, error_codes::CONFLICT, msg.clone()),
            ServerError::Store(StoreError::NotFound { entity_type, .. }) => (
                StatusCode::NOT_FOUND,
                error_codes::RESOURCE_NOT_FOUND,
                format!("{entity_type} not found."),
            ),
            ServerError::Store(e @ StoreError::AlreadyExists { .. }) => {
                (StatusCode::CONFLICT, error_codes::CONFLICT, e.to_string())
            }
            ServerError::Export(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "An internal server error occurred during export.".to_string(),
            ),
            ServerError::Store(_) | ServerError::Auth(_) | ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
