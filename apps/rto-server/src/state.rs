//! Application state.

use std::sync::Arc;

use auth::{AuthError, JwtManager, PasswordHasher};
use rto_store::RtoStore;

use crate::config::Config;
use crate::error::{ServerError, ServerResult};

/// Shared application state.
pub struct AppState<S: RtoStore> {
    /// Server configuration.
    pub config: Config,
    /// User and status store.
    pub store: S,
    /// JWT manager.
    pub jwt_manager: JwtManager,
    /// Password hasher.
    pub password_hasher: PasswordHasher,
}

impl<S: RtoStore> AppState<S> {
    /// Creates new application state.
    pub fn new(
        config: Config,
        store: S,
        jwt_manager: JwtManager,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            config,
            store,
            jwt_manager,
            password_hasher,
        }
    }

    /// Hashes a password on the blocking pool.
    pub async fn hash_password(&self, password: String) -> ServerResult<String> {
        let hasher = self.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServerError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(ServerError::from)
    }

    /// Verifies a password on the blocking pool.
    ///
    /// Hashes that cannot be parsed never match.
    pub async fn verify_password(&self, password: String, hash: String) -> ServerResult<bool> {
        let hasher = self.password_hasher.clone();
        let result = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ServerError::Internal(format!("Password check task failed: {e}")))?;

        match result {
            Ok(matches) => Ok(matches),
            Err(AuthError::MalformedHash(reason)) => {
                tracing::warn!(reason = %reason, "Stored password hash is not readable");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;
