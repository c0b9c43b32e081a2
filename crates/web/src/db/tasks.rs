//! Task repository.
//!
//! Tasks have no owner column; ownership is derived through the parent list.
//! Every statement joins `task` to `list` and filters on `list.owner_id`, so a
//! task can only be read or changed through a list its requester owns.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use tasklists_core::{ListId, TaskId, TaskTitle, UserId};

use super::RepositoryError;
use crate::models::{NewTask, Task, TaskChanges, TodoList};

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i32,
    list_id: i32,
    title: String,
    description: String,
    completed: bool,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let title = TaskTitle::parse(&row.title).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid title for task {}: {e}", row.id))
        })?;

        Ok(Self {
            id: TaskId::new(row.id),
            list_id: ListId::new(row.list_id),
            title,
            description: row.description,
            completed: row.completed,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Tasks of a list owned by `owner`: incomplete first, then most recently
    /// updated, then most recently created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_list(
        &self,
        list_id: ListId,
        owner: UserId,
    ) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT t.id, t.list_id, t.title, t.description, t.completed,
                   t.due_date, t.created_at, t.updated_at
            FROM tasklists.task t
            JOIN tasklists.list l ON l.id = t.list_id
            WHERE t.list_id = $1 AND l.owner_id = $2
            ORDER BY t.completed ASC, t.updated_at DESC, t.created_at DESC, t.id DESC
            ",
        )
        .bind(list_id)
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    /// Get a task by (task, list) pair, only if `owner` owns the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(
        &self,
        id: TaskId,
        list_id: ListId,
        owner: UserId,
    ) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT t.id, t.list_id, t.title, t.description, t.completed,
                   t.due_date, t.created_at, t.updated_at
            FROM tasklists.task t
            JOIN tasklists.list l ON l.id = t.list_id
            WHERE t.id = $1 AND t.list_id = $2 AND l.owner_id = $3
            ",
        )
        .bind(id)
        .bind(list_id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    /// Add a task to a list.
    ///
    /// Takes a resolved [`TodoList`] rather than an ID so that only a list
    /// that already passed the ownership filter can receive tasks. The insert
    /// re-checks ownership in SQL and returns `NotFound` if the list vanished
    /// or changed hands in between.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the list is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, list: &TodoList, task: &NewTask) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            INSERT INTO tasklists.task (list_id, title, description, completed, due_date)
            SELECT l.id, $3, $4, $5, $6
            FROM tasklists.list l
            WHERE l.id = $1 AND l.owner_id = $2
            RETURNING id, list_id, title, description, completed,
                      due_date, created_at, updated_at
            ",
        )
        .bind(list.id)
        .bind(list.owner)
        .bind(task.title.as_str())
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.due_date)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Task::try_from(row)
    }

    /// Apply an edit to a task owned (through its list) by `owner`.
    ///
    /// Only `title`, `description` and `due_date` are written; `completed`
    /// and `list_id` are left untouched. `updated_at` is refreshed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such owned task exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: TaskId,
        list_id: ListId,
        owner: UserId,
        changes: &TaskChanges,
    ) -> Result<Task, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            UPDATE tasklists.task t
            SET title = $4, description = $5, due_date = $6, updated_at = NOW()
            FROM tasklists.list l
            WHERE t.id = $1 AND t.list_id = $2
              AND l.id = t.list_id AND l.owner_id = $3
            RETURNING t.id, t.list_id, t.title, t.description, t.completed,
                      t.due_date, t.created_at, t.updated_at
            ",
        )
        .bind(id)
        .bind(list_id)
        .bind(owner)
        .bind(changes.title.as_str())
        .bind(&changes.description)
        .bind(changes.due_date)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Task::try_from(row)
    }

    /// Delete a task owned (through its list) by `owner`.
    ///
    /// # Returns
    ///
    /// Returns `true` if the task was deleted, `false` if no such owned task
    /// existed (including one that was already deleted).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_owned(
        &self,
        id: TaskId,
        list_id: ListId,
        owner: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM tasklists.task t
            USING tasklists.list l
            WHERE t.id = $1 AND t.list_id = $2
              AND l.id = t.list_id AND l.owner_id = $3
            ",
        )
        .bind(id)
        .bind(list_id)
        .bind(owner)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
