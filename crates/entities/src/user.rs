//! User-related entity definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Owner recorded on DL accounts created before owners were tracked.
pub const PRE_EXISTING_DL_OWNER: &str = "Pre-existing";

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Manages the user directory.
    Admin,
    /// Views history, exports reports and creates DL accounts.
    Manager,
    /// Views the dashboard.
    Engineer,
    /// Distribution list (shared mailbox) account.
    Dl,
}

impl UserRole {
    /// All roles, in the order they are presented.
    pub const ALL: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Manager,
        UserRole::Engineer,
        UserRole::Dl,
    ];

    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Engineer => "engineer",
            UserRole::Dl => "dl",
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownRole(s.to_string()))
    }
}

/// A stored user account.
///
/// Field names on the wire follow the JSON document written by earlier
/// versions of the dashboard. A stored role outside [`UserRole`] is a
/// load error, since it would grant no access anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Numeric identifier, unique within the store.
    pub id: u64,
    /// Employee ID or mailbox local part. Unique.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Login email. Unique.
    pub email: String,
    /// Password hash in PHC string format.
    pub password: String,
    pub role: UserRole,
    /// Manager name; set to the user's own name for managers.
    #[serde(default)]
    pub manager_name: Option<String>,
    /// Name of the manager who created a DL account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_owner: Option<String>,
}

impl User {
    /// Returns the user without the password hash.
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            manager_name: self.manager_name.clone(),
            dl_owner: self.dl_owner.clone(),
        }
    }
}

/// A user as returned by the directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub manager_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_owner: Option<String>,
}

/// A user that has not been assigned an ID yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub manager_name: Option<String>,
    pub dl_owner: Option<String>,
}

impl NewUser {
    /// Creates a directory user. Managers are their own manager.
    pub fn member(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let name = name.into();
        let manager_name = role.is_manager().then(|| name.clone());
        Self {
            username: username.into(),
            name,
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            manager_name,
            dl_owner: None,
        }
    }

    /// Creates a DL account owned by `owner`.
    ///
    /// The username and display name are the local part of the email.
    pub fn distribution_list(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let local_part = email.split('@').next().unwrap_or_default().to_string();
        Self {
            username: local_part.clone(),
            name: local_part,
            email,
            password_hash: password_hash.into(),
            role: UserRole::Dl,
            manager_name: None,
            dl_owner: Some(owner.into()),
        }
    }

    /// Attaches the assigned ID.
    pub fn into_user(self, id: u64) -> User {
        User {
            id,
            username: self.username,
            name: self.name,
            email: self.email,
            password: self.password_hash,
            role: self.role,
            manager_name: self.manager_name,
            dl_owner: self.dl_owner,
        }
    }
}
