//! List repository.
//!
//! Every query here is keyed by owner. A list that exists but belongs to
//! someone else is indistinguishable from one that does not exist.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tasklists_core::{ListId, ListName, UserId};

use super::RepositoryError;
use crate::models::{NewList, TodoList};

#[derive(Debug, sqlx::FromRow)]
struct ListRow {
    id: i32,
    owner_id: i32,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ListRow> for TodoList {
    type Error = RepositoryError;

    fn try_from(row: ListRow) -> Result<Self, Self::Error> {
        let name = ListName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid list name for list {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ListId::new(row.id),
            owner: UserId::new(row.owner_id),
            name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for list database operations.
pub struct ListRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ListRepository<'a> {
    /// Create a new list repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lists owned by `owner`, most recently updated first, then most
    /// recently created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<TodoList>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListRow>(
            r"
            SELECT id, owner_id, name, created_at, updated_at
            FROM tasklists.list
            WHERE owner_id = $1
            ORDER BY updated_at DESC, created_at DESC, id DESC
            ",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TodoList::try_from).collect()
    }

    /// Get a list by ID, only if `owner` owns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        id: ListId,
        owner: UserId,
    ) -> Result<Option<TodoList>, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(
            r"
            SELECT id, owner_id, name, created_at, updated_at
            FROM tasklists.list
            WHERE id = $1 AND owner_id = $2
            ",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        row.map(TodoList::try_from).transpose()
    }

    /// Create a list owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, owner: UserId, list: &NewList) -> Result<TodoList, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(
            r"
            INSERT INTO tasklists.list (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at, updated_at
            ",
        )
        .bind(owner)
        .bind(list.name.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        TodoList::try_from(row)
    }
}
