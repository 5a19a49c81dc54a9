//! Server configuration.

use std::env;
use std::path::PathBuf;

use auth::JwtConfig;

/// Secret used when `JWT_SECRET` is unset. Tokens signed with it survive
/// restarts but are forgeable by anyone who has read this source.
pub const DEVELOPMENT_JWT_SECRET: &str = "a-secure-and-static-secret-for-development-is-required";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Path of the JSON store file.
    pub database_path: PathBuf,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Issuer written into and required from every token.
    pub jwt_issuer: String,
    /// The only account allowed to upload RTO status.
    pub uploader_email: String,
    /// Email of the admin account created on first start.
    pub admin_email: String,
    /// Password of the admin account created on first start.
    pub admin_password: String,
    /// Directory served for paths outside the API.
    pub static_dir: PathBuf,
    /// Log level.
    pub log_level: String,
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("RTO_SERVER_HOST", "0.0.0.0"),
            port: parse_or(lookup("PORT"), "PORT", 3000)?,
            database_path: PathBuf::from(var("RTO_DATABASE_PATH", "db.json")),
            jwt_secret: var("JWT_SECRET", DEVELOPMENT_JWT_SECRET),
            jwt_expiration_hours: parse_or(
                lookup("RTO_JWT_EXPIRATION_HOURS"),
                "RTO_JWT_EXPIRATION_HOURS",
                auth::DEFAULT_JWT_EXPIRATION_HOURS,
            )?,
            jwt_issuer: var("RTO_JWT_ISSUER", auth::DEFAULT_JWT_ISSUER),
            uploader_email: var("RTO_UPLOADER_EMAIL", "RTOITVALIDATION@cognizant.com"),
            admin_email: var("RTO_ADMIN_EMAIL", "admin@cognizant.com"),
            admin_password: var("RTO_ADMIN_PASSWORD", "admin"),
            static_dir: PathBuf::from(var("RTO_STATIC_DIR", "public")),
            log_level: var("RTO_LOG_LEVEL", "info"),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the token signing settings.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone())
            .with_expiration_hours(self.jwt_expiration_hours)
            .with_issuer(self.jwt_issuer.clone())
    }

    /// Returns true if tokens are signed with the built-in secret.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }

    /// Returns true if `email` belongs to the uploading account.
    pub fn is_uploader(&self, email: &str) -> bool {
        self.uploader_email.eq_ignore_ascii_case(email)
    }
}
