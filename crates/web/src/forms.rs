//! HTML form binding and validation.
//!
//! Forms arrive as all-string structs through `axum::Form`. Each one is
//! validated into either a command the repositories accept (`NewList`,
//! `NewTask`, `TaskChanges`) or a [`FormErrors`] that the handler renders
//! back with the submitted values. Nothing is persisted unless every field
//! validates.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use tasklists_core::{ListName, TaskTitle, TextError};

use crate::models::{NewList, NewTask, Task, TaskChanges};

/// Message for a `due_date` that is neither empty nor `YYYY-MM-DD`.
pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date.";

/// Field-level and form-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Record a message that applies to the whole form.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Build an error set holding a single form-level message.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_non_field(message);
        errors
    }

    /// Messages for one field (empty if the field is valid).
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    /// Messages that apply to the whole form.
    #[must_use]
    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }
}

// =============================================================================
// Lists
// =============================================================================

/// Raw submission of the list form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListForm {
    #[serde(default)]
    pub name: String,
}

impl ListForm {
    /// Validate into a [`NewList`].
    ///
    /// # Errors
    ///
    /// Returns the field errors if `name` is blank or too long.
    pub fn validate(&self) -> Result<NewList, FormErrors> {
        ListName::parse(&self.name)
            .map(|name| NewList { name })
            .map_err(|e| {
                let mut errors = FormErrors::new();
                errors.add("name", e.to_string());
                errors
            })
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// Raw submission of the create-task form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Checkbox: absent when unticked.
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub due_date: String,
}

impl TaskForm {
    /// Validate into a [`NewTask`].
    ///
    /// # Errors
    ///
    /// Returns every field error found, not just the first.
    pub fn validate(&self) -> Result<NewTask, FormErrors> {
        let (title, description, due_date) =
            validate_task_fields(&self.title, &self.description, &self.due_date)?;

        Ok(NewTask {
            title,
            description,
            completed: parse_checkbox(self.completed.as_deref()),
            due_date,
        })
    }

    /// Values to redisplay in the form.
    #[must_use]
    pub fn values(&self) -> TaskFormValues {
        TaskFormValues {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: parse_checkbox(self.completed.as_deref()),
            due_date: self.due_date.clone(),
        }
    }
}

/// Raw submission of the edit-task form.
///
/// There is no `completed` field; a submitted value is dropped during
/// deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskEditForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
}

impl TaskEditForm {
    /// Validate into [`TaskChanges`].
    ///
    /// # Errors
    ///
    /// Returns every field error found, not just the first.
    pub fn validate(&self) -> Result<TaskChanges, FormErrors> {
        let (title, description, due_date) =
            validate_task_fields(&self.title, &self.description, &self.due_date)?;

        Ok(TaskChanges {
            title,
            description,
            due_date,
        })
    }

    /// Values to redisplay in the form. `completed` shows the stored state.
    #[must_use]
    pub fn values(&self, task: &Task) -> TaskFormValues {
        TaskFormValues {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: task.completed,
            due_date: self.due_date.clone(),
        }
    }
}

/// What the task form displays, whether blank, pre-filled or re-rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFormValues {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub due_date: String,
}

impl From<&Task> for TaskFormValues {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.to_string(),
            description: task.description.clone(),
            completed: task.completed,
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn validate_task_fields(
    title: &str,
    description: &str,
    due_date: &str,
) -> Result<(TaskTitle, String, Option<NaiveDate>), FormErrors> {
    let mut errors = FormErrors::new();

    let title = TaskTitle::parse(title)
        .map_err(|e| errors.add("title", e.to_string()))
        .ok();
    if description.contains('\0') {
        errors.add("description", TextError::NullCharacter.to_string());
    }
    let due_date = parse_due_date(due_date)
        .map_err(|e| errors.add("due_date", e))
        .ok();

    match (title, due_date) {
        (Some(title), Some(due_date)) if errors.is_empty() => {
            Ok((title, description.trim().to_string(), due_date))
        }
        _ => Err(errors),
    }
}

/// Interpret an HTML checkbox value.
///
/// Unticked boxes are not submitted at all; an explicit `""`, `false`, `off`
/// or `0` also counts as unticked.
#[must_use]
pub fn parse_checkbox(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None => false,
        Some(v) => !(v.is_empty()
            || v.eq_ignore_ascii_case("false")
            || v.eq_ignore_ascii_case("off")
            || v == "0"),
    }
}

/// Parse an optional `YYYY-MM-DD` date with a year in `1..=9999`.
///
/// # Errors
///
/// Returns [`INVALID_DATE_MESSAGE`] for anything else but an empty string.
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDate>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .filter(|date| (1..=9999).contains(&date.year()))
        .map(Some)
        .ok_or(INVALID_DATE_MESSAGE)
}
