use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, User};

/// Claims carried inside the bearer token: enough to identify the caller
/// and their role without a store round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Issues and verifies the opaque bearer credentials presented on each
/// request. HS256 over the configured secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a token for the user, bound to their id and role.
    pub fn issue(&self, user: &User) -> AppResult<String> {
        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Verifies a presented token and returns its claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }
}

/// Hashes a password with a per-hash salt.
pub fn hash_password(plain: &str) -> AppResult<String> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

/// Constant-interface verification against a stored hash.
pub fn verify_password(plain: &str, hash: &str) -> AppResult<bool> {
    Ok(bcrypt::verify(plain, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new(
            "ada@example.com".to_string(),
            "hash".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            role,
        )
    }

    #[test]
    fn test_token_round_trip_preserves_identity_and_role() {
        let signer = TokenSigner::new("test-secret", 1);
        let admin = user(Role::Admin);
        let token = signer.issue(&admin).unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1);
        assert!(matches!(
            signer.verify("not-a-token"),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1);
        let other = TokenSigner::new("different-secret", 1);
        let token = other.issue(&user(Role::User)).unwrap();
        assert!(matches!(
            signer.verify(&token),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", -1);
        let token = signer.issue(&user(Role::User)).unwrap();
        assert!(matches!(
            signer.verify(&token),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_password_hash_verifies_and_salts() {
        // Low-cost hash to keep the test quick
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());

        let second = bcrypt::hash("s3cret", 4).unwrap();
        assert_ne!(hash, second);
    }
}
