//! # Uzanto (Administrative User Management)
//!
//! `uzanto` is a small user-administration backend: operators log in with
//! username/password, receive a time-bounded signed token, and manage a
//! user collection behind that token.
//!
//! ## Credentials
//!
//! Passwords are stored as Argon2id PHC strings; the plaintext only exists
//! for the duration of a login or write request. Login failures never
//! reveal whether the username or the password was wrong.
//!
//! ## Tokens
//!
//! Tokens are stateless HMAC-SHA256 JWTs carrying only `{sub, exp}`. There
//! is no revocation list; validity is signature plus expiry at the moment
//! of verification. The signing secret is process configuration and the
//! process refuses to start without it.
//!
//! ## Uniqueness
//!
//! Usernames and emails are globally unique. The database unique
//! constraints are authoritative; the in-application conflict checks only
//! exist to attribute the conflicting field before paying for a hash.

pub mod api;
pub mod auth;
pub mod cli;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
