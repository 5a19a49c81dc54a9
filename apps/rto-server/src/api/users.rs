//! User directory API endpoints (admin only).

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use entities::{NewUser, UserRole};
use rto_protocol::{requests::*, responses::*};
use rto_store::RtoStore;

use crate::error::{ServerError, ServerResult};
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

const ADMIN_REQUIRED: &str = "Admin access required";

/// Registers a directory user.
pub async fn register_user<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> ServerResult<(StatusCode, Json<MessageResponse>)> {
    caller.require_role(UserRole::Admin, ADMIN_REQUIRED)?;

    let RegisterUserRequest {
        username,
        name,
        email,
        password,
        role,
    } = request;

    if [&username, &name, &email, &password, &role]
        .iter()
        .any(|field| field.is_empty())
    {
        return Err(ServerError::InvalidRequest(
            "Emp ID, Emp Name, email, password, and role are required.".to_string(),
        ));
    }
    let role: UserRole = role.parse()?;

    let password_hash = state.hash_password(password).await?;
    let user = state
        .store
        .create_user(NewUser::member(username, name, email, password_hash, role))
        .await?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        created_by = caller.id,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "User '{}' registered successfully as a {}.",
            user.username, user.role
        ))),
    ))
}

/// Lists all users without their password hashes.
pub async fn list_users<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ServerResult<Json<ListUsersResponse>> {
    caller.require_role(UserRole::Admin, ADMIN_REQUIRED)?;

    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(|u| u.public_view()).collect()))
}

/// Deletes a user. Admins cannot delete themselves.
pub async fn delete_user<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    caller.require_role(UserRole::Admin, ADMIN_REQUIRED)?;

    let id: u64 = id
        .parse()
        .map_err(|_| ServerError::InvalidRequest("Invalid user id.".to_string()))?;

    if id == caller.id {
        return Err(ServerError::InvalidRequest(
            "Admin cannot delete their own account.".to_string(),
        ));
    }

    state.store.delete_user(id).await?;

    tracing::info!(user_id = id, deleted_by = caller.id, "User deleted");

    Ok(Json(MessageResponse::new("User deleted successfully.")))
}
