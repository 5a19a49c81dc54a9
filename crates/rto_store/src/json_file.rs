//! JSON file backed store implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{NewUser, RtoStatusEntry, RtoStatusUpload, User, UserRole};
use tokio::sync::RwLock;

use crate::{Document, HistoryFilter, RtoStore, StoreResult};

/// Store that keeps the document in memory and rewrites the whole file
/// after each mutation.
///
/// Writers are serialized by the document lock, which is held across the
/// file write. A mutation only becomes visible once its write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: RwLock<Document>,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating the file if it does not exist.
    ///
    /// Documents written by earlier versions are migrated and written back.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut document = read_document(&path).await?;

        let report = document.migrate();
        if report.legacy_status_moved {
            tracing::info!("Migrated legacy rto_status into rto_status_history");
        }
        if report.dl_owners_backfilled > 0 {
            tracing::info!(
                count = report.dl_owners_backfilled,
                "Assigned placeholder owner to DL accounts"
            );
        }

        write_document(&path, &document).await?;

        tracing::info!(
            path = %path.display(),
            users = document.users.len(),
            uploads = document.rto_status_history.len(),
            "Opened JSON store"
        );

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    /// Applies `change` to a copy of the document, persists it, then
    /// publishes it.
    async fn mutate<T: Send>(
        &self,
        change: impl FnOnce(&mut Document) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        let mut document = self.document.write().await;
        let mut next = document.clone();
        let output = change(&mut next)?;
        write_document(&self.path, &next).await?;
        *document = next;
        Ok(output)
    }
}

async fn read_document(path: &Path) -> StoreResult<Document> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) if contents.trim().is_empty() => Ok(Document::default()),
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Store file not found, starting empty");
            Ok(Document::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes to a sibling temp file and renames it over the target. The temp
/// file is removed if the rename fails.
async fn write_document(path: &Path, document: &Document) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(document)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&tmp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), "Store flushed");
    Ok(())
}

#[async_trait]
impl RtoStore for JsonFileStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.mutate(|doc| doc.insert_user(user)).await
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
        self.mutate(|doc| doc.replace_user(user)).await
    }

    async fn delete_user(&self, id: u64) -> StoreResult<()> {
        self.mutate(|doc| doc.remove_user(id)).await
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
        self.mutate(|doc| Ok(doc.append_status(upload, uploaded_by, uploaded_at)))
            .await
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
    use serde_json::json;

    use super::*;
    use crate::StoreError;

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("db.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["users"], json!([]));
        assert_eq!(on_disk["rto_status_history"], json!([]));
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store
                .create_user(NewUser::member("E1", "Ana", "ana@example.com", "h", UserRole::Manager))
                .await
                .unwrap();
            store
                .append_status(RtoStatusUpload::default(), "u@example.com", Utc::now())
                .await
                .unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let ana = reopened.get_user_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(ana.manager_name.as_deref(), Some("Ana"));
        assert_eq!(reopened.latest_status().await.unwrap().unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store
            .create_user(NewUser::member("E1", "Ana", "ana@example.com", "h", UserRole::Engineer))
            .await
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let duplicate = store
            .create_user(NewUser::member("E1", "Other", "other@example.com", "h", UserRole::Engineer))
            .await;
        assert!(matches!(duplicate, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_open_migrates_legacy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            json!({
                "users": [],
                "rto_status": {
                    "summary_counts": { "completed": 9 },
                    "aging_matrix": { "statuses": {}, "totals": {} },
                    "uploadedBy": "old@example.com",
                    "uploadedAt": "2023-01-01T00:00:00.000Z"
                }
            })
            .to_string(),
        )
        .unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        let latest = store.latest_status().await.unwrap().unwrap();
        assert_eq!(latest.summary_counts.completed, 9);

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk.get("rto_status").is_none());
        assert_eq!(on_disk["rto_status_history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let result = write_document(&path, &Document::default()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!dir.path().join("db.json.tmp").exists());
        assert!(path.join("occupied").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::Serialization(_))
        ));
    }
}
