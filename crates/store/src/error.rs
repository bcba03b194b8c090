//! Crate-level error type returned by the [`Store`](crate::Store) facade.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::firebase::{AuthError, FirestoreError};
use crate::services::AccountError;
use crate::session::SessionStoreError;

/// Convenience alias used across the facade.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Anything a storefront operation can fail with.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identity provider error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Document store error.
    #[error(transparent)]
    Firestore(#[from] FirestoreError),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Account registration or login error.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Session persistence error.
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}
