//! Password hashing for credentials at rest.
//!
//! Argon2id with a per-call random salt; output is a self-describing PHC
//! string, so verification needs no stored parameters beyond the hash itself.

use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;

/// Errors produced by the password hasher.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("stored password hash is malformed")]
    MalformedHash,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

fn password_hasher() -> Argon2<'static> {
    // OWASP interactive-login parameters: 19 MiB, t=2, p=1.
    const MEMORY_COST_KIB: u32 = 19 * 1024;
    const ITERATIONS: u32 = 2;
    const PARALLELISM: u32 = 1;
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(32))
        .expect("valid Argon2 parameters");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a plaintext password with a freshly generated salt.
pub fn hash_password(plaintext: &str) -> Result<String, HashError> {
    if plaintext.is_empty() {
        return Err(HashError::EmptyPassword);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = password_hasher()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| HashError::Hashing(err.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// Returns `Ok(false)` on mismatch; errs only when the stored value is not a
/// recognizable hash.
pub fn verify_password(plaintext: &str, stored: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(stored).map_err(|_| HashError::MalformedHash)?;
    Ok(password_hasher().verify_password(plaintext.as_bytes(), &parsed).is_ok())
}
