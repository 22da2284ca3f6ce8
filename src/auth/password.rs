//! Password hashing and verification using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("stored value is not a recognizable password hash: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password into a PHC-formatted Argon2id string.
///
/// The salt is random per call, so the same plaintext never hashes to the
/// same string twice.
///
/// # Errors
/// Returns `PasswordError::Hashing` if the hasher itself fails.
pub fn hash(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hashed = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

    Ok(hashed.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// A mismatch is `Ok(false)`, not an error; only an unparseable stored
/// value is reported as `MalformedHash`.
pub fn verify(plaintext: &str, hashed: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hashed).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
    }
}
