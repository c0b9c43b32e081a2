//! Task route handlers.
//!
//! Every handler resolves its target through [`Ownership`] before doing
//! anything else, and a successful write always redirects to the parent
//! list's detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use tasklists_core::{ListId, TaskId};

use crate::db::TaskRepository;
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, TaskEditForm, TaskForm, TaskFormValues};
use crate::middleware::{RequireAuth, push_flash};
use crate::models::{FlashMessage, Task, TodoList};
use crate::routes::Page;
use crate::services::{Ownership, ownership};
use crate::state::AppState;

type ListPath = Result<Path<ListId>, PathRejection>;
type TaskPath = Result<Path<(ListId, TaskId)>, PathRejection>;

/// Task form template, shared by create and edit.
#[derive(Template, WebTemplate)]
#[template(path = "tasks/form.html")]
pub struct TaskFormTemplate {
    pub page: Page,
    pub list: TodoList,
    /// The task being edited; `None` on the create form.
    pub task: Option<Task>,
    pub values: TaskFormValues,
    pub errors: FormErrors,
}

impl TaskFormTemplate {
    /// Form target.
    #[must_use]
    pub fn action(&self) -> String {
        self.task
            .as_ref()
            .map_or_else(|| format!("{}tasks/new/", self.list.url()), Task::edit_url)
    }
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "tasks/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub page: Page,
    pub list: TodoList,
    pub task: Task,
}

// =============================================================================
// Create
// =============================================================================

/// Display the new task form.
#[instrument(skip(state, session, user, path), fields(user_id = %user.id))]
pub async fn new(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    path: ListPath,
) -> Result<impl IntoResponse, AppError> {
    let Path(list_id) = path.map_err(|_| ownership::not_found())?;
    let list = Ownership::new(state.pool()).list(user.id, list_id).await?;

    Ok(TaskFormTemplate {
        page: Page::load(&session, Some(user)).await,
        list,
        task: None,
        values: TaskFormValues::default(),
        errors: FormErrors::new(),
    })
}

/// Handle new task form submission.
#[instrument(skip(state, session, user, path, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    path: ListPath,
    Form(form): Form<TaskForm>,
) -> Result<Response, AppError> {
    let Path(list_id) = path.map_err(|_| ownership::not_found())?;
    let list = Ownership::new(state.pool()).list(user.id, list_id).await?;

    let new_task = match form.validate() {
        Ok(new_task) => new_task,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                TaskFormTemplate {
                    page: Page::load(&session, Some(user)).await,
                    list,
                    task: None,
                    values: form.values(),
                    errors,
                },
            )
                .into_response());
        }
    };

    let task = TaskRepository::new(state.pool())
        .create(&list, &new_task)
        .await?;
    tracing::info!(list_id = %list.id, task_id = %task.id, "Task created");

    push_flash(&session, FlashMessage::success("Task created.")).await;
    Ok(Redirect::to(&list.url()).into_response())
}

// =============================================================================
// Edit
// =============================================================================

/// Display the edit form for a task.
#[instrument(skip(state, session, user, path), fields(user_id = %user.id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    path: TaskPath,
) -> Result<impl IntoResponse, AppError> {
    let Path((list_id, task_id)) = path.map_err(|_| ownership::not_found())?;
    let ownership = Ownership::new(state.pool());
    let task = ownership.task(user.id, list_id, task_id).await?;
    let list = ownership.list(user.id, list_id).await?;

    Ok(TaskFormTemplate {
        page: Page::load(&session, Some(user)).await,
        list,
        values: TaskFormValues::from(&task),
        task: Some(task),
        errors: FormErrors::new(),
    })
}

/// Handle edit form submission.
///
/// Title, description and due date are replaced. Completion is left as it
/// was; the edit form does not carry it.
#[instrument(skip(state, session, user, path, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    path: TaskPath,
    Form(form): Form<TaskEditForm>,
) -> Result<Response, AppError> {
    let Path((list_id, task_id)) = path.map_err(|_| ownership::not_found())?;
    let ownership = Ownership::new(state.pool());
    let task = ownership.task(user.id, list_id, task_id).await?;

    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(errors) => {
            let list = ownership.list(user.id, list_id).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                TaskFormTemplate {
                    page: Page::load(&session, Some(user)).await,
                    list,
                    values: form.values(&task),
                    task: Some(task),
                    errors,
                },
            )
                .into_response());
        }
    };

    let task = TaskRepository::new(state.pool())
        .update(task.id, task.list_id, user.id, &changes)
        .await?;
    tracing::info!(list_id = %task.list_id, task_id = %task.id, "Task updated");

    push_flash(&session, FlashMessage::success("Task updated.")).await;
    Ok(Redirect::to(&format!("/lists/{}/", task.list_id)).into_response())
}

// =============================================================================
// Delete
// =============================================================================

/// Display the delete confirmation for a task.
#[instrument(skip(state, session, user, path), fields(user_id = %user.id))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    path: TaskPath,
) -> Result<impl IntoResponse, AppError> {
    let Path((list_id, task_id)) = path.map_err(|_| ownership::not_found())?;
    let ownership = Ownership::new(state.pool());
    let task = ownership.task(user.id, list_id, task_id).await?;
    let list = ownership.list(user.id, list_id).await?;

    Ok(ConfirmDeleteTemplate {
        page: Page::load(&session, Some(user)).await,
        list,
        task,
    })
}

/// Handle delete confirmation.
///
/// Deleting a task that is already gone is `NotFound`, like any other
/// unknown task.
#[instrument(skip(state, session, user, path), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    path: TaskPath,
) -> Result<Response, AppError> {
    let Path((list_id, task_id)) = path.map_err(|_| ownership::not_found())?;
    let task = Ownership::new(state.pool())
        .task(user.id, list_id, task_id)
        .await?;

    let deleted = TaskRepository::new(state.pool())
        .delete_owned(task.id, task.list_id, user.id)
        .await?;
    if !deleted {
        // Lost a race with another delete of the same task.
        return Err(ownership::not_found());
    }
    tracing::info!(list_id = %task.list_id, task_id = %task.id, "Task deleted");

    push_flash(&session, FlashMessage::success("Task deleted.")).await;
    Ok(Redirect::to(&format!("/lists/{}/", task.list_id)).into_response())
}
