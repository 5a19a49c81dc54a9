//! Authentication for the RTO status dashboard.
//!
//! This crate provides:
//! - JWT access token generation and validation
//! - Argon2 password hashing and verification

mod error;
mod jwt;
mod password;

pub use error::*;
pub use jwt::*;
pub use password::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 1;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "rto-dashboard";
