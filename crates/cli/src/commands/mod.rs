//! CLI command implementations.

pub mod migrate;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

/// Errors shared by commands that need a database connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using `TASKLISTS_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("TASKLISTS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| ConnectError::MissingEnvVar("TASKLISTS_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = tasklists_web::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
