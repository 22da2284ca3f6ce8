//! Input validation for user writes.
//!
//! Validation runs before any store access; a request that fails here
//! never costs a round trip or a hash.

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

/// A validated, normalized user write request.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserInput {
    /// Trim the username, normalize the email for lookup and uniqueness
    /// checks, and validate everything against the rule table.
    ///
    /// # Errors
    /// Returns the first failing rule.
    pub fn new(username: &str, email: &str, password: &str) -> Result<Self, ValidationError> {
        let input = Self {
            username: username.trim().to_string(),
            email: normalize_email(email),
            password: password.to_string(),
        };
        input.check()?;
        Ok(input)
    }

    fn check(&self) -> Result<(), ValidationError> {
        for rule in RULES {
            let value = match rule.field {
                "username" => &self.username,
                "email" => &self.email,
                _ => &self.password,
            };
            let length = value.chars().count();
            if length < rule.min {
                return Err(ValidationError {
                    field: rule.field,
                    reason: rule.too_short,
                });
            }
            if length > rule.max {
                return Err(ValidationError {
                    field: rule.field,
                    reason: rule.too_long,
                });
            }
        }

        if !valid_email(&self.email) {
            return Err(ValidationError {
                field: "email",
                reason: "is not a valid email address",
            });
        }

        Ok(())
    }
}

struct Rule {
    field: &'static str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        field: "username",
        min: 3,
        max: 32,
        too_short: "must be at least 3 characters",
        too_long: "must be at most 32 characters",
    },
    Rule {
        field: "email",
        min: 5,
        max: 255,
        too_short: "must be at least 5 characters",
        too_long: "must be at most 255 characters",
    },
    Rule {
        field: "password",
        min: 6,
        max: 255,
        too_short: "must be at least 6 characters",
        too_long: "must be at most 255 characters",
    },
];

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}
