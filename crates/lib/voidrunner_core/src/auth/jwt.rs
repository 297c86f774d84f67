//! Bearer token issuance, validation and revocation.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. The manager owns the revocation
//! set for its own lifetime; share it behind an `Arc` rather than creating
//! one per request.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::AuthError;
use super::clock::{Clock, SystemClock};
use crate::models::auth::Claims;
use crate::uuid::token_id;

/// Issuer written into every token and required on validation.
pub const ISSUER: &str = "voidrunner";

/// Issues, validates and revokes signed bearer tokens.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
    clock: Arc<dyn Clock>,
    /// Revoked token ids, mapped to the revoked token's `exp`.
    revoked: RwLock<HashMap<String, i64>>,
}

impl TokenManager {
    /// Create a manager backed by the wall clock.
    pub fn new(secret: &[u8], expiry: Duration) -> Self {
        Self::with_clock(secret, expiry, Arc::new(SystemClock))
    }

    /// Create a manager with an explicit time source.
    pub fn with_clock(secret: &[u8], expiry: Duration, clock: Arc<dyn Clock>) -> Self {
        // Only HS256 is accepted; time claims are checked against `clock`
        // after the signature has been verified.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiry,
            clock,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    /// Lifetime of newly issued tokens.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a signed token for the given identity.
    pub fn issue(&self, user_id: i64, username: &str, email: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        let exp = now
            .checked_add_signed(self.expiry)
            .ok_or_else(|| AuthError::Signing(format!("expiry out of range: {}", self.expiry)))?;
        let claims = Claims {
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            jti: token_id(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            iss: ISSUER.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(format!("jwt encode: {e}")))
    }

    /// Validate a token and return its claims.
    ///
    /// Structural, signature, algorithm, issuer and not-before failures are
    /// `InvalidToken`. A correctly signed token past its expiry is
    /// `ExpiredToken`. A live but revoked token is `InvalidToken`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode_verified(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;

        let now = self.clock.now().timestamp();
        if now < claims.nbf {
            debug!(jti = %claims.jti, "token used before nbf");
            return Err(AuthError::InvalidToken);
        }
        if now > claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        let revoked = self
            .revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&claims.jti);
        if revoked {
            debug!(jti = %claims.jti, "revoked token presented");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// Revoke a token. The signature must verify; expiry is ignored, so an
    /// expired token can be revoked. Revoking twice is not an error.
    pub fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.decode_verified(token).map_err(|e| {
            AuthError::Revocation(format!("failed to parse token for revocation: {e}"))
        })?;

        self.revoked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(claims.jti.clone(), claims.exp);

        debug!(jti = %claims.jti, user_id = claims.user_id, "token revoked");
        Ok(())
    }

    /// Number of token ids currently held in the revocation set.
    pub fn revoked_count(&self) -> usize {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop revoked ids whose tokens have expired. Returns how many were removed.
    ///
    /// Expiry is checked before revocation in [`validate`](Self::validate), so
    /// forgetting an expired id changes no outcome.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now().timestamp();
        let mut revoked = self.revoked.write().unwrap_or_else(PoisonError::into_inner);
        let before = revoked.len();
        revoked.retain(|_, exp| *exp >= now);
        before - revoked.len()
    }

    /// Spawn a periodic task that sweeps expired ids from the revocation set.
    pub fn spawn_sweep_task(self: &Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = manager.sweep_expired();
                if removed > 0 {
                    info!(removed, "swept expired revocations");
                }
            }
        })
    }

    fn decode_verified(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}
