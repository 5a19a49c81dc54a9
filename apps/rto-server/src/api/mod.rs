//! API endpoints.

pub mod auth;
pub mod dl;
pub mod rto_status;
pub mod users;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use rto_store::RtoStore;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Creates the API router with all endpoints.
///
/// Everything except login and the health check requires a bearer token.
pub fn create_router<S: RtoStore + 'static>(
    state: Arc<AppState<S>>,
) -> Router<Arc<AppState<S>>> {
    let protected = Router::new()
        // Account endpoints
        .route("/api/auth/change-password", put(auth::change_password))
        // User directory endpoints (admin)
        .route("/api/users", get(users::list_users))
        .route("/api/users/register", post(users::register_user))
        .route("/api/users/:id", delete(users::delete_user))
        // Distribution list endpoints (manager)
        .route("/api/dl/register", post(dl::register_dl))
        // RTO status endpoints
        .route("/api/rto-status/upload", post(rto_status::upload_status))
        .route("/api/rto-status/latest", get(rto_status::get_latest))
        .route("/api/rto-status/summary", get(rto_status::get_summary))
        .route("/api/rto-status/history", get(rto_status::list_history))
        .route("/api/rto-status/export", get(rto_status::export_history))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        .route("/api/auth/login", post(auth::login))
        // Health check
        .route("/health", get(health_check))
        .merge(protected)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for driving the router in tests.

    use std::sync::Arc;

    use auth::{JwtManager, PasswordHasher, TokenSubject};
    use axum::{
        Router,
        body::{Body, Bytes},
        http::{Method, Request, StatusCode, header},
    };
    use entities::{NewUser, User, UserRole};
    use rto_store::{MemoryRtoStore, RtoStore};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::state::AppState;

    pub const UPLOADER_EMAIL: &str = "uploader@example.com";

    /// State over an empty in-memory store with a cheap hasher.
    pub fn test_state() -> Arc<AppState<MemoryRtoStore>> {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".to_string()),
            "RTO_UPLOADER_EMAIL" => Some(UPLOADER_EMAIL.to_string()),
            "RTO_STATIC_DIR" => Some("does-not-exist".to_string()),
            _ => None,
        })
        .unwrap();
        let jwt_manager = JwtManager::new(config.jwt_config());
        let hasher = PasswordHasher::with_cost(1024, 1).unwrap();
        Arc::new(AppState::new(config, MemoryRtoStore::new(), jwt_manager, hasher))
    }

    pub fn app(state: &Arc<AppState<MemoryRtoStore>>) -> Router {
        crate::create_app(state.clone())
    }

    /// Stores a user with a hashed password.
    pub async fn seed_user(
        state: &Arc<AppState<MemoryRtoStore>>,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> User {
        let hash = state.hash_password(password.to_string()).await.unwrap();
        state
            .store
            .create_user(NewUser::member(username, username, email, hash, role))
            .await
            .unwrap()
    }

    pub fn token_for(state: &Arc<AppState<MemoryRtoStore>>, user: &User) -> String {
        state
            .jwt_manager
            .generate_token(TokenSubject::from(user))
            .unwrap()
    }

    /// Sends a request and returns the status and raw body.
    pub async fn send_raw(
        app: Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, header::HeaderMap, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes)
    }

    /// Sends a request and parses the body as JSON (`Null` when empty).
    pub async fn send(
        app: Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = send_raw(app, method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
