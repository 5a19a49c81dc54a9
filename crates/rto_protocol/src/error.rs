//! API error body and codes.

use serde::{Deserialize, Serialize};

/// Machine readable codes carried alongside error messages.
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const AUTHENTICATION_REQUIRED: &str = "authentication_required";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const INVALID_TOKEN: &str = "invalid_token";
    pub const PERMISSION_DENIED: &str = "permission_denied";
    pub const RESOURCE_NOT_FOUND: &str = "resource_not_found";
    pub const CONFLICT: &str = "conflict";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Body of every failed response.
///
/// `message` is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
        }
    }
}
