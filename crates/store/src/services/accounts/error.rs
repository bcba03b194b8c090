use thiserror::Error;

use chouxlab_core::EmailError;

use crate::db::RepositoryError;
use crate::firebase::AuthError;

/// Errors from account registration and login flows.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The email address does not parse.
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    /// The password is shorter than the provider accepts.
    #[error("password must be at least {minimum} characters")]
    PasswordTooShort { minimum: usize },

    /// Identity provider error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Profile write failed after sign-in.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
