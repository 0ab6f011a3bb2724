use argon2::{self, Config as ArgonConfig};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::models::Role;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Verified against when a login names no account.
static UNKNOWN_ACCOUNT_DIGEST: Lazy<String> = Lazy::new(|| {
    argon2::hash_encoded(b"unknown-account", b"unknown-account-salt", &ArgonConfig::default())
        .unwrap_or_default()
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub user_type: Role,
    pub iat: usize,
    pub exp: usize, // Expiration time as UTC timestamp
}

/// Password hashing and session token signing.
#[derive(Clone)]
pub struct CredentialService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl CredentialService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, token_ttl: Duration) -> Self {
        CredentialService {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    /// Argon2 with a fresh random salt per call.
    pub fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt: [u8; 16] = rand::thread_rng().gen();
        let config = ArgonConfig::default();
        Ok(argon2::hash_encoded(plaintext.as_bytes(), &salt, &config)?)
    }

    pub fn verify_password(&self, plaintext: &str, digest: &str) -> bool {
        argon2::verify_encoded(digest, plaintext.as_bytes()).unwrap_or(false)
    }

    /// Spend the same work as [`Self::verify_password`] on a login whose email
    /// matched nobody. Always false.
    pub fn reject_unknown(&self, plaintext: &str) -> bool {
        let _ = self.verify_password(plaintext, &UNKNOWN_ACCOUNT_DIGEST);
        false
    }

    pub fn issue_token(&self, subject_id: i64, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject_id.to_string(),
            user_type: role,
            iat: now.timestamp() as usize,
            exp: (now + self.token_ttl).timestamp().max(0) as usize,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }
}
