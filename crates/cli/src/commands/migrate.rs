//! Database migration command.
//!
//! Applies the schema migrations in `crates/web/migrations/`, then creates
//! the session table used by the web server's session store. Both steps are
//! idempotent.

use tower_sessions_sqlx_store::PostgresStore;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running schema migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
