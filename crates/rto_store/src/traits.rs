//! Store trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{NewUser, RtoStatusEntry, RtoStatusUpload, User, UserRole};

use crate::StoreResult;

/// Filter options for listing the upload history.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only entries uploaded at or after this instant.
    pub uploaded_from: Option<DateTime<Utc>>,
    /// Only entries uploaded at or before this instant.
    pub uploaded_to: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

impl HistoryFilter {
    /// Returns true if the entry's upload time is inside the range.
    pub fn matches(&self, entry: &RtoStatusEntry) -> bool {
        self.uploaded_from.is_none_or(|from| entry.uploaded_at >= from)
            && self.uploaded_to.is_none_or(|to| entry.uploaded_at <= to)
    }
}

/// Trait for dashboard storage operations.
#[async_trait]
pub trait RtoStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a user with the next free ID.
    ///
    /// Fails with `AlreadyExists` if the username or email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: u64) -> StoreResult<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Gets the first user holding a role.
    async fn find_user_by_role(&self, role: UserRole) -> StoreResult<Option<User>>;

    /// Lists all users in insertion order.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Overwrites a user.
    async fn update_user(&self, user: User) -> StoreResult<User>;

    /// Deletes a user.
    async fn delete_user(&self, id: u64) -> StoreResult<()>;

    // =========================================================================
    // RTO status operations
    // =========================================================================

    /// Appends an upload to the history and returns the stored entry.
    async fn append_status(
        &self,
        upload: RtoStatusUpload,
        uploaded_by: &str,
        uploaded_at: DateTime<Utc>,
    ) -> StoreResult<RtoStatusEntry>;

    /// Gets the most recently appended entry.
    async fn latest_status(&self) -> StoreResult<Option<RtoStatusEntry>>;

    /// Lists the history, most recent first.
    async fn list_status_history(&self, filter: HistoryFilter) -> StoreResult<Vec<RtoStatusEntry>>;

    /// Gets an entry by ID.
    async fn get_status(&self, id: u64) -> StoreResult<Option<RtoStatusEntry>>;
}
