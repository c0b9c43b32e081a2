//! The authorization filter.
//!
//! Every list and task handler resolves its target through [`Ownership`]
//! before reading or writing anything. The requester's ID is an explicit
//! argument; nothing here reads ambient request state.
//!
//! A missing entity and an entity owned by someone else both come back as
//! [`AppError::NotFound`] with the same message, so a non-owner learns nothing
//! about which IDs exist.

use sqlx::PgPool;

use tasklists_core::{ListId, TaskId, UserId};

use crate::db::{ListRepository, TaskRepository};
use crate::error::AppError;
use crate::models::{Task, TodoList};

/// Message carried by every ownership-related `NotFound`.
pub const NOT_FOUND_MESSAGE: &str = "No matching object found";

/// Ownership-scoped lookups.
pub struct Ownership<'a> {
    lists: ListRepository<'a>,
    tasks: TaskRepository<'a>,
}

impl<'a> Ownership<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            lists: ListRepository::new(pool),
            tasks: TaskRepository::new(pool),
        }
    }

    /// Resolve a list owned by `requester`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the list does not exist or is not
    /// owned by `requester`, and `AppError::Database` if the lookup fails.
    pub async fn list(&self, requester: UserId, list_id: ListId) -> Result<TodoList, AppError> {
        self.lists
            .get_owned(list_id, requester)
            .await?
            .ok_or_else(not_found)
    }

    /// Resolve a task by (list, task) pair, requiring that `requester` owns
    /// the parent list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task does not exist, belongs to a
    /// different list, or its list is not owned by `requester`.
    pub async fn task(
        &self,
        requester: UserId,
        list_id: ListId,
        task_id: TaskId,
    ) -> Result<Task, AppError> {
        self.tasks
            .get_owned(task_id, list_id, requester)
            .await?
            .ok_or_else(not_found)
    }
}

/// The single `NotFound` value produced by the filter.
#[must_use]
pub fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
}
