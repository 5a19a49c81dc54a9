//! In-memory store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{NewUser, RtoStatusEntry, RtoStatusUpload, User, UserRole};
use tokio::sync::RwLock;

use crate::{Document, HistoryFilter, RtoStore, StoreResult};

/// Store that keeps the document in memory only.
///
/// Used by tests and by deployments that do not need persistence.
#[derive(Debug, Default)]
pub struct MemoryRtoStore {
    document: RwLock<Document>,
}

impl MemoryRtoStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RtoStore for MemoryRtoStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.document.write().await.insert_user(user)
    }

    async fn get_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.document.read().await.user(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.document.read().await.user_by_email(email).cloned())
    }

    async fn find_user_by_role(&self, role: UserRole) -> StoreResult<Option<User>> {
        Ok(self.document.read().await.user_by_role(role).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.document.read().await.users.clone())
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        self.document.write().await.replace_user(user)
    }

    async fn delete_user(&self, id: u64) -> StoreResult<()> {
        self.document.write().await.remove_user(id)
    }

    // =========================================================================
    // RTO status operations
    // =========================================================================

    async fn append_status(
        &self,
        upload: RtoStatusUpload,
        uploaded_by: &str,
        uploaded_at: DateTime<Utc>,
    ) -> StoreResult<RtoStatusEntry> {
        Ok(self
            .document
            .write()
            .await
            .append_status(upload, uploaded_by, uploaded_at))
    }

    async fn latest_status(&self) -> StoreResult<Option<RtoStatusEntry>> {
        Ok(self.document.read().await.latest_status().cloned())
    }

    async fn list_status_history(&self, filter: HistoryFilter) -> StoreResult<Vec<RtoStatusEntry>> {
        Ok(self.document.read().await.history(&filter))
    }

    async fn get_status(&self, id: u64) -> StoreResult<Option<RtoStatusEntry>> {
        Ok(self.document.read().await.status(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[tokio::test]
    async fn test_user_crud() {
        let store = MemoryRtoStore::new();

        // Create
        let user = NewUser::member("E1", "Ana", "ana@example.com", "hash", UserRole::Engineer);
        let created = store.create_user(user).await.unwrap();
        assert_eq!(created.id, 1);

        // Get
        let fetched = store.get_user_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ana");
        assert!(store.find_user_by_role(UserRole::Admin).await.unwrap().is_none());

        // Update
        let mut changed = fetched.clone();
        changed.password = "other".to_string();
        store.update_user(changed).await.unwrap();
        assert_eq!(store.get_user(1).await.unwrap().unwrap().password, "other");

        // Delete
        store.delete_user(1).await.unwrap();
        assert!(store.get_user(1).await.unwrap().is_none());
        assert!(matches!(
            store.delete_user(1).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_history() {
        let store = MemoryRtoStore::new();
        assert!(store.latest_status().await.unwrap().is_none());

        let first = store
            .append_status(RtoStatusUpload::default(), "u@example.com", Utc::now())
            .await
            .unwrap();
        let second = store
            .append_status(RtoStatusUpload::default(), "u@example.com", Utc::now())
            .await
            .unwrap();

        assert_eq!(store.latest_status().await.unwrap().unwrap().id, second.id);
        let history = store.list_status_history(HistoryFilter::default()).await.unwrap();
        assert_eq!(history.iter().map(|e| e.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(store.get_status(first.id).await.unwrap().unwrap(), first);
    }
}
