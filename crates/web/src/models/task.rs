//! Task domain types.

use chrono::{DateTime, NaiveDate, Utc};

use tasklists_core::{ListId, TaskId, TaskTitle};

/// A unit of work inside one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    /// Parent list. Fixed at creation.
    pub list_id: ListId,
    pub title: TaskTitle,
    /// Free text, empty when not provided.
    pub description: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// URL of the task's edit form.
    #[must_use]
    pub fn edit_url(&self) -> String {
        format!("/lists/{}/tasks/{}/edit/", self.list_id, self.id)
    }

    /// URL of the task's delete confirmation.
    #[must_use]
    pub fn delete_url(&self) -> String {
        format!("/lists/{}/tasks/{}/delete/", self.list_id, self.id)
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: TaskTitle,
    pub description: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
}

/// Validated input for editing a task.
///
/// There is deliberately no `completed` field: completion is only chosen
/// when the task is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: TaskTitle,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}
