//! Authentication API endpoints.

use std::sync::Arc;

use auth::TokenSubject;
use axum::{Extension, Json, extract::State};
use rto_protocol::{requests::*, responses::*};
use rto_store::RtoStore;

use crate::error::{ServerError, ServerResult};
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Shortest password accepted on change.
pub const MIN_PASSWORD_LEN: usize = 6;

fn invalid_credentials() -> ServerError {
    ServerError::InvalidCredentials("Invalid email or password.".to_string())
}

/// Exchanges email and password for an access token.
pub async fn login<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let Some(user) = state.store.get_user_by_email(&request.email).await? else {
        tracing::info!(email = %request.email, "Login for unknown email");
        return Err(invalid_credentials());
    };

    if !state
        .verify_password(request.password, user.password.clone())
        .await?
    {
        tracing::info!(user_id = user.id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let token = state.jwt_manager.generate_token(TokenSubject::from(&user))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse { token }))
}

/// Changes the caller's password.
pub async fn change_password<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ServerResult<Json<MessageResponse>> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Current and new passwords are required.".to_string(),
        ));
    }
    if request.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServerError::InvalidRequest(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }

    let mut user = state
        .store
        .get_user(caller.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found.".to_string()))?;

    if !state
        .verify_password(request.current_password, user.password.clone())
        .await?
    {
        return Err(ServerError::InvalidCredentials(
            "Incorrect current password.".to_string(),
        ));
    }

    user.password = state.hash_password(request.new_password).await?;
    state.store.update_user(user).await?;

    tracing::info!(user_id = caller.id, "Password changed");

    Ok(Json(MessageResponse::new("Password updated successfully.")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use entities::UserRole;
    use rto_store::RtoStore;
    use serde_json::json;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_login() {
        let state = test_state();
        let user = seed_user(&state, "E100", "eng@example.com", "secret1", UserRole::Engineer).await;

        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "eng@example.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let claims = state
            .jwt_manager
            .validate_token(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.role, UserRole::Engineer);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let state = test_state();
        seed_user(&state, "E100", "eng@example.com", "secret1", UserRole::Engineer).await;

        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "eng@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email and password are required.");

        for (email, password) in [("eng@example.com", "wrong"), ("nobody@example.com", "secret1")] {
            let (status, body) = send(
                app(&state),
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid email or password.");
        }
    }

    #[tokio::test]
    async fn test_login_with_mistyped_body() {
        let state = test_state();

        let (status, body) = send(
            app(&state),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": 5, "password": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert!(body["message"].as_str().unwrap().contains("email"));
    }

    #[tokio::test]
    async fn test_login_with_unreadable_hash() {
        let state = test_state();
        state
            .store
            .create_user(entities::NewUser::member(
                "E1",
                "Old",
                "old@example.com",
                "$2b$10$abcdefghijklmnopqrstuu",
                UserRole::Engineer,
            ))
            .await
            .unwrap();

        let (status, _) = send(
            app(&state),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "old@example.com", "password": "whatever" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_change_password() {
        let state = test_state();
        let user = seed_user(&state, "E100", "eng@example.com", "secret1", UserRole::Engineer).await;
        let token = token_for(&state, &user);

        let (status, body) = send(
            app(&state),
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "wrong", "newPassword": "secret2" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Incorrect current password.");

        let (status, _) = send(
            app(&state),
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "secret1", "newPassword": "short" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app(&state),
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "secret1", "newPassword": "secret2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            app(&state),
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "eng@example.com", "password": "secret2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_change_password_for_deleted_user() {
        let state = test_state();
        let user = seed_user(&state, "E100", "eng@example.com", "secret1", UserRole::Engineer).await;
        let token = token_for(&state, &user);
        state.store.delete_user(user.id).await.unwrap();

        let (status, _) = send(
            app(&state),
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "secret1", "newPassword": "secret2" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
