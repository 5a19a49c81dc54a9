//! Authentication middleware and role guards.

use std::sync::Arc;

use auth::{Claims, JwtManager, TokenSubject};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use entities::UserRole;
use rto_store::RtoStore;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Authenticated user information, taken from the token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: u64,
    /// User display name.
    pub name: String,
    /// User email.
    pub email: String,
    /// Role at the time the token was issued.
    pub role: UserRole,
    /// Manager name, set for managers and engineers.
    pub manager_name: Option<String>,
}

impl From<TokenSubject> for AuthenticatedUser {
    fn from(subject: TokenSubject) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            email: subject.email,
            role: subject.role,
            manager_name: subject.manager_name,
        }
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(claims.subject()?.into())
    }
}

impl AuthenticatedUser {
    /// Fails with 403 and `message` unless the user has `role`.
    pub fn require_role(&self, role: UserRole, message: &str) -> ServerResult<()> {
        self.require_any_role(&[role], message)
    }

    /// Fails with 403 and `message` unless the user has one of `roles`.
    pub fn require_any_role(&self, roles: &[UserRole], message: &str) -> ServerResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.id, role = %self.role, "Role check failed");
            Err(ServerError::PermissionDenied(message.to_string()))
        }
    }
}

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Validates a JWT token and returns the user it was issued for.
fn authenticate(jwt_manager: &JwtManager, token: &str) -> ServerResult<AuthenticatedUser> {
    let claims = jwt_manager.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ServerError::InvalidToken
    })?;
    AuthenticatedUser::try_from(claims).map_err(|_| ServerError::InvalidToken)
}

/// Authentication middleware.
///
/// Extracts the JWT token from the Authorization header, validates it, and
/// stores the authenticated user in the request extensions. A missing token
/// is answered with 401, an invalid or expired one with 403.
pub async fn auth_middleware<S: RtoStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return ServerError::AuthenticationRequired.into_response();
    };

    match authenticate(&state.jwt_manager, token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
