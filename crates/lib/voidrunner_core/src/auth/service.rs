//! Registration, login and logout flows.

use std::sync::{Arc, OnceLock};

use tokio::task;
use tracing::{error, info};

use super::AuthError;
use super::jwt::TokenManager;
use super::password::{hash_password, verify_password};
use crate::models::auth::{
    Claims, Credential, LoginRequest, LoginResponse, NewCredential, RegisterRequest, User,
};
use crate::store::{CredentialStore, StoreError};

/// Orchestrates the credential store, password hasher and token manager.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenManager>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenManager>) -> Self {
        Self { store, tokens }
    }

    /// Register a new identity.
    ///
    /// Username is trimmed; email is trimmed and lowercased. A collision on
    /// either field is `AlreadyExists`.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();
        if username.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "username, email, and password are required".into(),
            ));
        }

        let existing = self
            .store
            .find_by_identifier(&username, &email)
            .await
            .map_err(|e| store_failure("check existing user", e))?;
        if existing.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password = req.password;
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hash task: {e}")))?
            .inspect_err(|e| error!(error = %e, "failed to hash password"))?;

        let credential = self
            .store
            .create(NewCredential {
                username,
                email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::AlreadyExists,
                other => store_failure("create user", other),
            })?;

        info!(user_id = credential.id, username = %credential.username, "user registered");
        Ok(User::from(credential))
    }

    /// Authenticate by username or email and issue a token.
    ///
    /// An unknown identifier and a wrong password produce the same
    /// `InvalidCredentials`, and both pay for one bcrypt verification.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AuthError> {
        let identifier = req.identifier.trim();
        if identifier.is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "identifier and password are required".into(),
            ));
        }

        let found = self
            .store
            .find_by_identifier(identifier, &identifier.to_lowercase())
            .await
            .map_err(|e| store_failure("look up user", e))?;

        let stored_hash = found.as_ref().map(|c| c.password_hash.clone());
        let password = req.password;
        let outcome = task::spawn_blocking(move || {
            let hash = stored_hash.as_deref().unwrap_or_else(|| dummy_hash());
            verify_password(&password, hash)
        })
        .await;
        let verified = verified_or_deny(outcome);

        let credential: Credential = match found {
            Some(c) if verified => c,
            _ => {
                info!("login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self
            .tokens
            .issue(credential.id, &credential.username, &credential.email)
            .inspect_err(|e| error!(error = %e, "failed to issue token"))?;

        info!(user_id = credential.id, "user logged in");
        Ok(LoginResponse {
            token,
            user: User::from(credential),
        })
    }

    /// Revoke the given token.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::Validation("token is required".into()));
        }
        self.tokens.revoke(token)?;
        info!("user logged out");
        Ok(())
    }

    /// Validate a bearer token; see [`TokenManager::validate`].
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.validate(token)
    }

    /// Load the user behind validated claims, if the record still exists.
    pub async fn current_user(&self, claims: &Claims) -> Result<Option<User>, AuthError> {
        let credential = self
            .store
            .find_by_id(claims.user_id)
            .await
            .map_err(|e| store_failure("load user", e))?;
        Ok(credential.map(User::from))
    }
}

/// A verification task that died counts as a failed check.
fn verified_or_deny(outcome: Result<bool, task::JoinError>) -> bool {
    outcome.unwrap_or_else(|e| {
        error!(error = %e, "password verification task failed");
        false
    })
}

fn store_failure(action: &str, e: StoreError) -> AuthError {
    error!(error = %e, "failed to {action}");
    AuthError::Store(e)
}

/// Hash verified against when the identifier matches nobody, so unknown
/// identifiers cost the same as wrong passwords.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("voidrunner-timing-equalizer").unwrap_or_default())
}
