//! JWT token generation and validation.

use chrono::{Duration, Utc};
use entities::{User, UserRole};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthError, AuthResult, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_JWT_ISSUER};

/// The identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub manager_name: Option<String>,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            manager_name: user.manager_name.clone(),
        }
    }
}

/// JWT claims for dashboard access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as a string).
    pub sub: String,
    /// Numeric user ID.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "managerName", default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// JWT ID.
    pub jti: String,
}

impl Claims {
    /// Creates new claims for a subject.
    pub fn new(subject: TokenSubject, issuer: &str, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: subject.id.to_string(),
            id: subject.id,
            name: subject.name,
            email: subject.email,
            role: subject.role,
            manager_name: subject.manager_name,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Returns the subject carried by the token.
    pub fn subject(&self) -> AuthResult<TokenSubject> {
        if self.sub != self.id.to_string() {
            return Err(AuthError::InvalidToken);
        }
        Ok(TokenSubject {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            manager_name: self.manager_name.clone(),
        })
    }
}

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token expiration in hours.
    pub expiration_hours: u64,
    /// Token issuer.
    pub issuer: String,
}

impl JwtConfig {
    /// Creates a new JWT configuration.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
        }
    }

    /// Sets the expiration time in hours.
    pub fn with_expiration_hours(mut self, hours: u64) -> Self {
        self.expiration_hours = hours;
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a new JWT manager.
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an access token.
    pub fn generate_token(&self, subject: TokenSubject) -> AuthResult<String> {
        let claims = Claims::new(subject, &self.config.issuer, self.config.expiration_hours);

        tracing::debug!(user_id = claims.id, jti = %claims.jti, "Issuing access token");

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtEncoding(e.to_string()))
    }

    /// Validates and decodes a token.
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject {
        TokenSubject {
            id: 42,
            name: "Jane Roe".to_string(),
            email: "jane@example.com".to_string(),
            role: UserRole::Manager,
            manager_name: Some("Jane Roe".to_string()),
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let config = JwtConfig::new("test-secret-key-must-be-long-enough-for-security");
        let manager = JwtManager::new(config);

        let token = manager.generate_token(subject()).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.subject().unwrap(), subject());
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.iss, DEFAULT_JWT_ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::new("test-secret-key-must-be-long-enough-for-security");
        let manager = JwtManager::new(config);

        let result = manager.validate_token("invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 = JwtManager::new(JwtConfig::new("secret-one-must-be-long-enough"));
        let manager2 = JwtManager::new(JwtConfig::new("secret-two-must-be-long-enough"));

        let token = manager1.generate_token(subject()).unwrap();

        assert!(manager2.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let secret = "shared-secret-must-be-long-enough";
        let issuer_a = JwtManager::new(JwtConfig::new(secret).with_issuer("a"));
        let issuer_b = JwtManager::new(JwtConfig::new(secret).with_issuer("b"));

        let token = issuer_a.generate_token(subject()).unwrap();

        assert!(issuer_b.validate_token(&token).is_err());
    }

    #[test]
    fn test_claims_payload_shape() {
        let claims = Claims::new(subject(), DEFAULT_JWT_ISSUER, 1);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["role"], "manager");
        assert_eq!(json["managerName"], "Jane Roe");
    }
}
