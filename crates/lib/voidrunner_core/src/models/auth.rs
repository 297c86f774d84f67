//! Authentication domain models.
//!
//! `Credential` carries the password hash and stays inside the store/service
//! boundary. Everything handed to callers goes through the `User` view.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored identity record, including the password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    /// Always lowercase.
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Fields required to create a credential. The store assigns id and timestamps.
#[derive(Clone)]
pub struct NewCredential {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Public view of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Credential> for User {
    fn from(c: Credential) -> Self {
        Self {
            id: c.id,
            username: c.username,
            email: c.email,
            first_name: c.first_name,
            last_name: c.last_name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Login input. `identifier` is matched against both username and email.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// Unique token id, the revocation key.
    pub jti: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Not before (unix seconds).
    pub nbf: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    pub iss: String,
}
