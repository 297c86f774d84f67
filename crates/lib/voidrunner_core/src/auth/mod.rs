//! Authentication and session authority.
//!
//! Provides password hashing, bearer token issuance/validation/revocation,
//! and the register/login/logout flows shared by the HTTP layer.

pub mod clock;
pub mod jwt;
pub mod password;
pub mod service;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
///
/// `Hashing`, `Signing`, `Revocation` and `Store` carry internal detail for
/// logs; callers facing untrusted clients must not echo it.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Revocation error: {0}")]
    Revocation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
