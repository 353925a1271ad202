//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp, jti}`. The signing secret
//! is held by the service for the life of the process; verification is a pure
//! function of (token, secret, current time). `jsonwebtoken` performs the
//! signature comparison in constant time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued-at time (seconds since epoch)
    pub iat: usize,
    /// Expiration time (seconds since epoch)
    pub exp: usize,
    /// Token id, so two tokens issued within the same second still differ
    pub jti: String,
}

/// Token verification failures. All of these collapse to an unauthenticated
/// pass-through at the filter boundary; none are surfaced to clients.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies signed, time-limited identity tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with the given secret and token lifetime.
    ///
    /// The secret is read-only after construction; rotating it invalidates
    /// every previously issued token.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock leeway: a token one second past its expiry is expired.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token binding the subject to the current time plus the
    /// configured TTL. Concurrent issuance for the same subject is
    /// independent; each call yields a distinct valid token.
    pub fn issue(&self, subject: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| Error::internal(format!("System clock before epoch: {}", err)))?
            .as_secs() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as usize,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("Failed to encode token: {}", err)))
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> std::result::Result<String, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    _ => TokenError::Malformed,
                }
            })?;
        Ok(token_data.claims.sub)
    }
}
