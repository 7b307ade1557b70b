//! Password hashing and verification

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AuthError;

/// Hash a password with Argon2id and a fresh random salt.
///
/// The default parameters are tuned for interactive logins; the cost is
/// embedded in the PHC string, so it can be raised later without breaking
/// existing hashes.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// A malformed stored hash counts as a failed verification, never an error:
/// login must not distinguish a corrupt credential row from a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(!hash.is_empty());
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password("secret1").unwrap();
        let hash2 = hash_password("secret1").unwrap();

        // Fresh salt per call
        assert_ne!(hash1, hash2);
        assert!(verify_password("secret1", &hash1));
        assert!(verify_password("secret1", &hash2));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("secret1", ""));
        assert!(!verify_password("secret1", "not-a-phc-string"));
        assert!(!verify_password("secret1", "$argon2id$truncated"));
    }
}
