//! Authentication service.
//!
//! Password accounts hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

use sqlx::PgPool;

use tasklists_core::Username;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash checked on a username miss so it costs as much as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no account has this password").ok());

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create_with_password(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with username and password.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_password_hash(&username).await? else {
            verify_against_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();
    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Spend one Argon2 verification without a real account behind it.
fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
