//! Startup tasks.

use entities::{NewUser, User, UserRole};
use rto_store::RtoStore;

use crate::error::ServerResult;
use crate::state::AppState;

/// Username of the account created when the directory has no admin.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Creates the default admin account unless an admin already exists.
///
/// Returns the created account.
pub async fn ensure_admin<S: RtoStore>(state: &AppState<S>) -> ServerResult<Option<User>> {
    if let Some(admin) = state.store.find_user_by_role(UserRole::Admin).await? {
        tracing::debug!(user_id = admin.id, "Admin account present");
        return Ok(None);
    }

    let password_hash = state
        .hash_password(state.config.admin_password.clone())
        .await?;
    let admin = state
        .store
        .create_user(NewUser::member(
            DEFAULT_ADMIN_USERNAME,
            "Admin User",
            state.config.admin_email.clone(),
            password_hash,
            UserRole::Admin,
        ))
        .await?;

    tracing::warn!(
        email = %admin.email,
        "Created default admin account; change its password after first login"
    );
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;

    #[tokio::test]
    async fn test_creates_admin_once() {
        let state = test_state();

        let admin = ensure_admin(&state).await.unwrap().unwrap();
        assert_eq!(admin.username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(admin.email, state.config.admin_email);
        assert!(admin.manager_name.is_none());
        assert!(state
            .verify_password(state.config.admin_password.clone(), admin.password)
            .await
            .unwrap());

        assert!(ensure_admin(&state).await.unwrap().is_none());
        assert_eq!(state.store.list_users().await.unwrap().len(), 1);
    }
}
