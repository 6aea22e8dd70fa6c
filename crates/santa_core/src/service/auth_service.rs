//! Organizer registration, login and token authentication.
//!
//! # Invariants
//! - Login failures do not reveal whether the email exists.
//! - Emails are normalized before storage and lookup.

use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_CHARS};
use crate::auth::token::{TokenError, TokenSigner};
use crate::model::user::User;
use crate::model::{normalize_email, normalize_name, ValidationError};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AuthError {
    Validation(ValidationError),
    EmailTaken,
    InvalidCredentials,
    InvalidToken(TokenError),
    /// Token was valid but its subject no longer exists.
    UnknownUser,
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmailTaken => write!(f, "email already registered"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::InvalidToken(err) => write!(f, "invalid token: {err}"),
            Self::UnknownUser => write!(f, "user not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidToken(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate(_) => Self::EmailTaken,
            other => Self::Repo(other),
        }
    }
}

/// Bearer token plus the account it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

/// Authentication facade over a user repository.
pub struct AuthService<'a, R: UserRepository> {
    repo: R,
    signer: &'a TokenSigner,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repo: R, signer: &'a TokenSigner) -> Self {
        Self { repo, signer }
    }

    /// Creates an organizer account and signs it in.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email)?;
        let name = normalize_name("name", name)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ValidationError::PasswordTooShort {
                min_chars: MIN_PASSWORD_CHARS,
            }
            .into());
        }

        if self.repo.find_user_by_email(&email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = self
            .repo
            .create_user(&email, &name, &hash_password(password))?;
        info!("event=user_register module=auth status=ok user_id={}", user.id);

        Ok(self.session_for(user))
    }

    /// Verifies credentials and issues a fresh token.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Ok(email) = normalize_email(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        match self.repo.find_user_by_email(&email)? {
            Some(user) if verify_password(password, &user.password_hash) => {
                info!("event=user_login module=auth status=ok user_id={}", user.id);
                Ok(self.session_for(user))
            }
            _ => {
                warn!("event=user_login module=auth status=error error_code=invalid_credentials");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Resolves a bearer token to its user.
    pub fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.signer.verify(token).map_err(AuthError::InvalidToken)?;
        self.repo.get_user(claims.sub)?.ok_or(AuthError::UnknownUser)
    }

    fn session_for(&self, user: User) -> AuthSession {
        AuthSession {
            access_token: self.signer.issue(user.id),
            user,
        }
    }
}
