//! Account management commands.
//!
//! Deleting an account is the only way lists are ever removed: the database
//! cascades the delete to the user's lists and from there to their tasks.

use tasklists_core::Username;
use tasklists_web::db::{RepositoryError, UserRepository};
use tasklists_web::services::{AuthError, AuthService};

use super::{ConnectError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("No user named {0}")]
    NotFound(String),
}

/// Create an account with a password.
pub async fn create(username: &str, password: &str) -> Result<(), UserError> {
    let pool = connect().await?;

    let user = AuthService::new(&pool)
        .register_with_password(username, password)
        .await?;

    tracing::info!(user_id = %user.id, "Created user {}", user.username);
    Ok(())
}

/// Print every account with its list count.
pub async fn list() -> Result<(), UserError> {
    let pool = connect().await?;

    let users = UserRepository::new(&pool).list_with_list_counts().await?;

    #[allow(clippy::print_stdout)]
    {
        if users.is_empty() {
            println!("No users.");
        }
        for summary in users {
            println!(
                "{:>6}  {:<30}  {} list(s)",
                summary.user.id, summary.user.username, summary.list_count
            );
        }
    }
    Ok(())
}

/// Delete an account, cascading to its lists and their tasks.
pub async fn delete(username: &str) -> Result<(), UserError> {
    let username =
        Username::parse(username).map_err(|e| UserError::InvalidUsername(e.to_string()))?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| UserError::NotFound(username.to_string()))?;

    if !users.delete(user.id).await? {
        return Err(UserError::NotFound(username.to_string()));
    }

    tracing::info!(user_id = %user.id, "Deleted user {} and everything they owned", username);
    Ok(())
}
