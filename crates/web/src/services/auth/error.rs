//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] tasklists_core::UsernameError),

    /// Wrong password, or no account with that username.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
