//! API response bodies.

use serde::{Deserialize, Serialize};

pub use entities::{DashboardSummary, PublicUser, RtoStatusEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Acknowledgement carrying a message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStatusResponse {
    pub message: String,
    /// ID assigned to the stored entry.
    pub id: u64,
}

pub type ListUsersResponse = Vec<PublicUser>;

pub type StatusHistoryResponse = Vec<RtoStatusEntry>;
