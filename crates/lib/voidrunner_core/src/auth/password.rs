//! Password hashing via bcrypt.
//!
//! Hashing can fail; verification cannot. A malformed digest or empty input
//! verifies as `false` so the login path always degrades to "deny".

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10, random salt per call).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if password.is_empty() || hash.is_empty() {
        return false;
    }
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext() {
        let hash = hash_password("testpassword123").unwrap();
        assert!(!hash.is_empty());
        assert_ne!(hash, "testpassword123");
    }

    #[test]
    fn same_password_hashes_differently() {
        let h1 = hash_password("testpassword123").unwrap();
        let h2 = hash_password("testpassword123").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("testpassword123", &h1));
        assert!(verify_password("testpassword123", &h2));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("testpassword123").unwrap();
        assert!(!verify_password("wrongpassword", &hash));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let hash = hash_password("testpassword123").unwrap();
        assert!(!verify_password("", &hash));
        assert!(!verify_password("testpassword123", ""));
    }

    #[test]
    fn malformed_hash_is_rejected() {
        assert!(!verify_password("testpassword123", "not-a-bcrypt-hash"));
        assert!(!verify_password("testpassword123", "$2b$10$short"));
    }
}
