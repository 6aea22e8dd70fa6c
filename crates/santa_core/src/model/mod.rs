//! Domain records for users, exchange events and participants.
//!
//! # Responsibility
//! - Define the canonical shapes shared by repositories and services.
//! - Validate user-supplied fields before they reach storage.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Validation failures are reported as `ValidationError`, never panics.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod participant;
pub mod user;

const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 255;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required name field is blank after trim.
    EmptyName(&'static str),
    /// A name field exceeds the storage limit.
    NameTooLong(&'static str),
    /// Email is not of the form `local@domain.tld`.
    InvalidEmail(String),
    /// Exchange date is not a `YYYY-MM-DD` calendar date.
    InvalidExchangeDate(String),
    /// Budget is negative or not a finite amount.
    InvalidBudget,
    /// Password is shorter than the accepted minimum.
    PasswordTooShort { min_chars: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(field) => write!(f, "{field} must not be blank"),
            Self::NameTooLong(field) => {
                write!(f, "{field} must be at most {MAX_NAME_CHARS} characters")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidExchangeDate(value) => {
                write!(f, "invalid exchange date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidBudget => write!(f, "budget must be a non-negative amount"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "password must be at least {min_chars} characters")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a display name and checks it is present and bounded.
pub fn normalize_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName(field));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong(field));
    }
    Ok(trimmed.to_string())
}

/// Trims and lowercases an email, rejecting malformed values.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > MAX_EMAIL_CHARS || !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail(trimmed.to_string()));
    }
    Ok(trimmed.to_lowercase())
}
