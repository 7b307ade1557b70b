//! JWT session token management

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Canonical session lifetime: one TTL for the token and the cookie.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Numeric user ID from the subject claim
    pub fn user_id(&self) -> i64 {
        self.sub.parse().unwrap_or(0)
    }
}

/// Signing and verification keys for session tokens
///
/// Built from an optional secret so the server can boot without one; issue
/// and verify then fail with `SecretNotConfigured`, which surfaces as a
/// 500-class response and as an issue in the verification probe, never as
/// "invalid credentials".
#[derive(Clone)]
pub struct SessionKeys {
    keys: Option<(EncodingKey, DecodingKey)>,
}

impl SessionKeys {
    /// Create session keys from an optional secret; empty counts as absent
    pub fn new(secret: Option<&str>) -> Self {
        let keys = secret.filter(|s| !s.is_empty()).map(|s| {
            (
                EncodingKey::from_secret(s.as_bytes()),
                DecodingKey::from_secret(s.as_bytes()),
            )
        });
        Self { keys }
    }

    /// Whether a signing secret is configured
    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    /// Issue a session token for a user
    pub fn issue(&self, user_id: i64, email: &str, name: Option<&str>) -> Result<String, AuthError> {
        let (encoding_key, _) = self.keys.as_ref().ok_or(AuthError::SecretNotConfigured)?;

        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.map(|n| n.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(SESSION_TTL_SECS)).timestamp(),
        };

        debug!("Issuing session token for user: {}", email);

        encode(&Header::default(), &claims, encoding_key).map_err(|_| AuthError::InvalidToken)
    }

    /// Verify a session token and return its claims
    ///
    /// Fails closed: expired, tampered, and malformed tokens are all
    /// indistinguishable `InvalidToken` results.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let (_, decoding_key) = self.keys.as_ref().ok_or(AuthError::SecretNotConfigured)?;

        let token_data = decode::<SessionClaims>(token, decoding_key, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> SessionKeys {
        SessionKeys::new(Some("test-secret-key"))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let keys = test_keys();

        let token = keys.issue(7, "ann@x.com", Some("Ann")).unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.user_id(), 7);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.name.as_deref(), Some("Ann"));
        assert!(claims.exp - claims.iat == SESSION_TTL_SECS);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = test_keys();
        assert!(matches!(
            keys.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = test_keys();
        let token = keys.issue(7, "ann@x.com", None).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(keys.verify(&tampered).is_err());

        // Signed with a different secret
        let other = SessionKeys::new(Some("other-secret"));
        let foreign = other.issue(7, "ann@x.com", None).unwrap();
        assert!(matches!(keys.verify(&foreign), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = test_keys();

        // Encode claims that expired well past the default validation leeway
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "7".to_string(),
            email: "ann@x.com".to_string(),
            name: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_missing_secret_is_a_config_error() {
        let keys = SessionKeys::new(None);
        assert!(!keys.is_configured());
        assert!(matches!(
            keys.issue(1, "a@b.c", None),
            Err(AuthError::SecretNotConfigured)
        ));
        assert!(matches!(
            keys.verify("anything"),
            Err(AuthError::SecretNotConfigured)
        ));

        // Empty string counts as unconfigured
        assert!(!SessionKeys::new(Some("")).is_configured());
    }
}
