//! List route handlers.

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

use tasklists_core::ListId;

use crate::db::{ListRepository, TaskRepository};
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, ListForm};
use crate::middleware::{RequireAuth, push_flash};
use crate::models::{FlashMessage, Task, TodoList};
use crate::routes::Page;
use crate::services::{Ownership, ownership};
use crate::state::AppState;

/// Where list creation lands.
const LIST_INDEX: &str = "/lists/";

/// List index template.
#[derive(Template, WebTemplate)]
#[template(path = "lists/index.html")]
pub struct ListIndexTemplate {
    pub page: Page,
    pub lists: Vec<TodoList>,
}

/// New list form template.
#[derive(Template, WebTemplate)]
#[template(path = "lists/form.html")]
pub struct ListFormTemplate {
    pub page: Page,
    pub name: String,
    pub errors: FormErrors,
}

/// List detail template.
#[derive(Template, WebTemplate)]
#[template(path = "lists/detail.html")]
pub struct ListDetailTemplate {
    pub page: Page,
    pub list: TodoList,
    pub tasks: Vec<Task>,
}

/// Display the requester's lists, most recently updated first.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let lists = ListRepository::new(state.pool())
        .list_for_owner(user.id)
        .await?;

    Ok(ListIndexTemplate {
        page: Page::load(&session, Some(user)).await,
        lists,
    })
}

/// Display the new list form.
pub async fn new(RequireAuth(user): RequireAuth, session: Session) -> impl IntoResponse {
    ListFormTemplate {
        page: Page::load(&session, Some(user)).await,
        name: String::new(),
        errors: FormErrors::new(),
    }
}

/// Handle new list form submission.
///
/// The owner is always the requester.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<ListForm>,
) -> Result<Response, AppError> {
    let new_list = match form.validate() {
        Ok(new_list) => new_list,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ListFormTemplate {
                    page: Page::load(&session, Some(user)).await,
                    name: form.name,
                    errors,
                },
            )
                .into_response());
        }
    };

    let list = ListRepository::new(state.pool())
        .create(user.id, &new_list)
        .await?;
    tracing::info!(list_id = %list.id, "List created");

    push_flash(&session, FlashMessage::success("List created.")).await;
    Ok(Redirect::to(LIST_INDEX).into_response())
}

/// Display a list with its tasks, incomplete tasks first.
#[instrument(skip(state, session, user, list_id), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    list_id: Result<Path<ListId>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(list_id) = list_id.map_err(|_| ownership::not_found())?;

    let list = Ownership::new(state.pool()).list(user.id, list_id).await?;
    let tasks = TaskRepository::new(state.pool())
        .list_for_list(list.id, user.id)
        .await?;

    Ok(ListDetailTemplate {
        page: Page::load(&session, Some(user)).await,
        list,
        tasks,
    })
}
