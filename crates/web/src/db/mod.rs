//! Database operations for the to-do `PostgreSQL` database.
//!
//! ## Tables (schema `tasklists`)
//!
//! - `user` - Accounts with Argon2 password hashes
//! - `list` - Named lists, `owner_id` references `user` (cascade)
//! - `task` - Tasks, `list_id` references `list` (cascade)
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! Every list and task query carries the owner predicate in SQL, either on
//! `list.owner_id` directly or through a join from `task` to `list`. There is
//! no lookup by bare ID.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p tasklists-cli -- migrate
//! ```

pub mod lists;
pub mod tasks;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use lists::ListRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
