//! Distribution list account endpoints (manager only).

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};
use entities::{NewUser, UserRole};
use rto_protocol::{requests::*, responses::*};
use rto_store::RtoStore;

use crate::error::{ServerError, ServerResult};
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Creates a DL account owned by the calling manager.
pub async fn register_dl<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateDlRequest>,
) -> ServerResult<(StatusCode, Json<MessageResponse>)> {
    caller.require_role(UserRole::Manager, "Manager access required")?;

    if request.email.is_empty() || request.password.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Email and password are required.".to_string(),
        ));
    }

    if state.store.get_user_by_email(&request.email).await?.is_some() {
        return Err(ServerError::Conflict(
            "A user with this email already exists.".to_string(),
        ));
    }

    let password_hash = state.hash_password(request.password).await?;
    let dl = state
        .store
        .create_user(NewUser::distribution_list(
            request.email,
            password_hash,
            caller.name.clone(),
        ))
        .await?;

    tracing::info!(user_id = dl.id, owner = %caller.name, "DL account created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "DL account '{}' created successfully.",
            dl.email
        ))),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use entities::UserRole;
    use rto_store::RtoStore;
    use serde_json::json;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_manager_creates_dl() {
        let state = test_state();
        let manager =
            seed_user(&state, "E200", "mgr@example.com", "secret1", UserRole::Manager).await;
        let token = token_for(&state, &manager);

        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/dl/register",
            Some(&token),
            Some(json!({ "email": "team-rto@example.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body["message"],
            "DL account 'team-rto@example.com' created successfully."
        );

        let dl = state
            .store
            .get_user_by_email("team-rto@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dl.role, UserRole::Dl);
        assert_eq!(dl.username, "team-rto");
        assert_eq!(dl.name, "team-rto");
        assert_eq!(dl.dl_owner.as_deref(), Some("E200"));
        assert!(dl.manager_name.is_none());

        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/dl/register",
            Some(&token),
            Some(json!({ "email": "team-rto@example.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "A user with this email already exists.");
    }

    #[tokio::test]
    async fn test_dl_validation_and_guard() {
        let state = test_state();
        let manager =
            seed_user(&state, "E200", "mgr@example.com", "secret1", UserRole::Manager).await;
        let engineer =
            seed_user(&state, "E100", "eng@example.com", "secret1", UserRole::Engineer).await;

        let (status, _) = send(
            app(&state),
            Method::POST,
            "/api/dl/register",
            Some(&token_for(&state, &manager)),
            Some(json!({ "email": "team@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/dl/register",
            Some(&token_for(&state, &engineer)),
            Some(json!({ "email": "team@example.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Manager access required");
    }
}
