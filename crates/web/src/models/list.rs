//! To-do list domain types.

use chrono::{DateTime, Utc};

use tasklists_core::{ListId, ListName, UserId};

/// A named container of tasks, owned by exactly one user.
///
/// `owner` is fixed at creation; no code path rewrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    pub id: ListId,
    pub owner: UserId,
    pub name: ListName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoList {
    /// Canonical URL of the list's detail page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/lists/{}/", self.id)
    }
}

/// Validated input for creating a list. The owner comes from the session,
/// never from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewList {
    pub name: ListName,
}
