//! User account record.
//!
//! # Responsibility
//! - Define the persisted account shape and its input rules.
//!
//! # Invariants
//! - `email` is trimmed and unique case-insensitively across the collection.
//! - `password` is stored as entered; this store is a local demo, not an
//!   identity provider.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("valid email regex"));

/// Rejected account input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidEmail(String),
    PasswordTooShort { min_chars: usize },
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "password must be at least {min_chars} characters")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Persisted account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub password: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Builds a user from raw form input.
    ///
    /// Trims the email and enforces the email shape and password length.
    pub fn new(
        email: &str,
        password: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, UserValidationError> {
        let email = normalize_email(email)?;
        let password = password.into();
        validate_password(&password)?;
        Ok(Self {
            email,
            password,
            created_at,
        })
    }

    /// Case-insensitive email comparison used for lookups and uniqueness.
    pub fn has_email(&self, email: &str) -> bool {
        emails_match(&self.email, email)
    }
}

/// Trims `raw` and checks it looks like `local@domain`.
pub fn normalize_email(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(UserValidationError::InvalidEmail(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(UserValidationError::PasswordTooShort {
            min_chars: MIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

pub fn emails_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
