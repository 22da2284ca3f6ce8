//! Login, password hashing and token handling.

pub mod guard;
pub mod password;
pub mod token;

use crate::users::store::UserStore;
use thiserror::Error;
use token::TokenCodec;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Authenticate an operator and mint an access token bound to the username.
///
/// A lookup miss and a password mismatch are deliberately collapsed into
/// the same `InvalidCredentials` so callers cannot enumerate usernames.
///
/// # Errors
/// Returns `AuthError::InvalidCredentials` on any credential failure and
/// `AuthError::Internal` for store or signing faults.
pub async fn login(
    store: &dyn UserStore,
    codec: &TokenCodec,
    username: &str,
    plaintext_password: &str,
) -> Result<String, AuthError> {
    let Some(user) = store
        .find_by_username(username)
        .await
        .map_err(AuthError::Internal)?
    else {
        return Err(AuthError::InvalidCredentials);
    };

    let matches = password::verify(plaintext_password, &user.password_hash).map_err(|e| {
        error!("stored password hash for {} is unreadable: {e}", user.id);
        AuthError::Internal(e.into())
    })?;

    if !matches {
        return Err(AuthError::InvalidCredentials);
    }

    codec
        .issue_default(&user.username)
        .map_err(|e| AuthError::Internal(e.into()))
}
