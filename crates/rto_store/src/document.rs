//! The JSON document backing every store.

use chrono::{DateTime, Utc};
use entities::{NewUser, RtoStatusEntry, RtoStatusUpload, User, UserRole, PRE_EXISTING_DL_OWNER};
use serde::{Deserialize, Serialize};

use crate::{HistoryFilter, StoreError, StoreResult};

/// The whole persisted state.
///
/// The layout matches `db.json` files written by earlier deployments,
/// including the single-entry `rto_status` key that predates the history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    /// Uploads in the order they arrived, oldest first.
    #[serde(default)]
    pub rto_status_history: Vec<RtoStatusEntry>,
    /// Legacy single status; folded into the history by [`Document::migrate`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rto_status: Option<RtoStatusEntry>,
}

/// What [`Document::migrate`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// The legacy `rto_status` entry was moved into the history.
    pub legacy_status_moved: bool,
    /// Number of DL accounts that received the placeholder owner.
    pub dl_owners_backfilled: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.legacy_status_moved || self.dl_owners_backfilled > 0
    }
}

impl Document {
    /// Upgrades documents written by earlier versions in place.
    pub fn migrate(&mut self) -> MigrationReport {
        let mut report = MigrationReport::default();

        if let Some(legacy) = self.rto_status.take() {
            self.rto_status_history.insert(0, legacy);
            report.legacy_status_moved = true;
        }

        for user in self
            .users
            .iter_mut()
            .filter(|u| u.role == UserRole::Dl && u.dl_owner.as_deref().is_none_or(str::is_empty))
        {
            user.dl_owner = Some(PRE_EXISTING_DL_OWNER.to_string());
            report.dl_owners_backfilled += 1;
        }

        report
    }

    fn next_user_id(&self) -> u64 {
        self.users.iter().map(|u| u.id).max().map_or(1, |max| max + 1)
    }

    fn next_status_id(&self) -> u64 {
        self.rto_status_history
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Checks username and email uniqueness against every user except `skip_id`.
    fn ensure_unique(&self, username: &str, email: &str, skip_id: Option<u64>) -> StoreResult<()> {
        let others: Vec<&User> = self
            .users
            .iter()
            .filter(|u| Some(u.id) != skip_id)
            .collect();
        if others.iter().any(|u| u.username == username) {
            return Err(StoreError::already_exists("User", "username"));
        }
        if others.iter().any(|u| u.email == email) {
            return Err(StoreError::already_exists("User", "email"));
        }
        Ok(())
    }

    pub fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        self.ensure_unique(&user.username, &user.email, None)?;
        let user = user.into_user(self.next_user_id());
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_role(&self, role: UserRole) -> Option<&User> {
        self.users.iter().find(|u| u.role == role)
    }

    pub fn replace_user(&mut self, user: User) -> StoreResult<User> {
        self.ensure_unique(&user.username, &user.email, Some(user.id))?;
        let slot = self
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StoreError::not_found("User", user.id))?;
        *slot = user.clone();
        Ok(user)
    }

    pub fn remove_user(&mut self, id: u64) -> StoreResult<()> {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        if self.users.len() == before {
            return Err(StoreError::not_found("User", id));
        }
        Ok(())
    }

    pub fn append_status(
        &mut self,
        upload: RtoStatusUpload,
        uploaded_by: &str,
        uploaded_at: DateTime<Utc>,
    ) -> RtoStatusEntry {
        let entry = RtoStatusEntry::new(self.next_status_id(), upload, uploaded_by, uploaded_at);
        self.rto_status_history.push(entry.clone());
        entry
    }

    pub fn latest_status(&self) -> Option<&RtoStatusEntry> {
        self.rto_status_history.last()
    }

    pub fn status(&self, id: u64) -> Option<&RtoStatusEntry> {
        self.rto_status_history.iter().find(|e| e.id == id)
    }

    /// Returns matching entries, most recent first.
    pub fn history(&self, filter: &HistoryFilter) -> Vec<RtoStatusEntry> {
        self.rto_status_history
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .skip(filter.offset.unwrap_or(0) as usize)
            .take(filter.limit.map_or(usize::MAX, |limit| limit as usize))
            .cloned()
            .collect()
    }
}
