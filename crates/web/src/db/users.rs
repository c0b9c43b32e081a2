//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tasklists_core::{UserId, Username};

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// A user together with the number of lists they own.
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub user: User,
    pub list_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct UserSummaryRow {
    #[sqlx(flatten)]
    user: UserRow,
    list_count: i64,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, created_at, updated_at
            FROM tasklists.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, created_at, updated_at
            FROM tasklists.user
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user with a pre-computed password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO tasklists.user (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, created_at, updated_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// Get a user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r"
            SELECT id, username, created_at, updated_at, password_hash
            FROM tasklists.user
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// List every user with the number of lists they own, by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_list_counts(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r"
            SELECT u.id, u.username, u.created_at, u.updated_at,
                   COUNT(l.id) AS list_count
            FROM tasklists.user u
            LEFT JOIN tasklists.list l ON l.owner_id = u.id
            GROUP BY u.id
            ORDER BY u.username
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(UserSummary {
                    user: User::try_from(row.user)?,
                    list_count: row.list_count,
                })
            })
            .collect()
    }

    /// Delete a user. Their lists, and those lists' tasks, go with them.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tasklists.user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
