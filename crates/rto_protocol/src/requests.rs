//! API request bodies.
//!
//! Text fields default to empty so that missing fields are reported with
//! the same message as blank ones.

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

// ============================================================================
// User Directory Requests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    /// Employee ID.
    #[serde(default)]
    pub username: String,
    /// Employee name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// One of `admin`, `manager`, `engineer`, `dl`.
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDlRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// RTO Status Queries
// ============================================================================

/// Query string of the history listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Query string of the export endpoint.
///
/// Either `id` or both dates must be given. Dates are `YYYY-MM-DD` or
/// RFC 3339; the end date covers its whole UTC day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `xlsx` (default) or `csv`.
    pub format: Option<String>,
}
