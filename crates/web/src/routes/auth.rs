//! Authentication route handlers.
//!
//! Username/password accounts: login, registration and logout. A successful
//! login or registration lands on the `next` path if it is a local one,
//! otherwise on the list index.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::FormErrors;
use crate::middleware::{OptionalAuth, clear_current_user, push_flash, set_current_user};
use crate::models::{CurrentUser, FlashMessage, User};
use crate::routes::Page;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Where to go after login when no usable `next` was given.
pub const DEFAULT_LANDING: &str = "/lists/";

// =============================================================================
// Form Types
// =============================================================================

/// Query string of the login and registration pages.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub next: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).unwrap_or(DEFAULT_LANDING);
    if user.is_some() {
        return Redirect::to(next).into_response();
    }

    LoginTemplate {
        page: Page::load(&session, None).await,
        username: String::new(),
        next: next.to_string(),
        errors: FormErrors::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(Some(&form.next)).unwrap_or(DEFAULT_LANDING);
    let auth = AuthService::new(state.pool());

    match auth.login_with_password(&form.username, &form.password).await {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(next).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login rejected");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                LoginTemplate {
                    page: Page::load(&session, None).await,
                    username: form.username.trim().to_string(),
                    next: next.to_string(),
                    errors: FormErrors::non_field(
                        "Please enter a correct username and password.",
                    ),
                },
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).unwrap_or(DEFAULT_LANDING);
    if user.is_some() {
        return Redirect::to(next).into_response();
    }

    RegisterTemplate {
        page: Page::load(&session, None).await,
        username: String::new(),
        next: next.to_string(),
        errors: FormErrors::new(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// Creates the account and logs it in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let next = safe_next(Some(&form.next)).unwrap_or(DEFAULT_LANDING);

    let mut errors = FormErrors::new();
    if form.password == form.password_confirm {
        match AuthService::new(state.pool())
            .register_with_password(&form.username, &form.password)
            .await
        {
            Ok(user) => {
                start_session(&session, &user).await?;
                push_flash(&session, FlashMessage::success("Account created.")).await;
                tracing::info!(user_id = %user.id, "User registered");
                return Ok(Redirect::to(next).into_response());
            }
            Err(AuthError::InvalidUsername(e)) => errors.add("username", e.to_string()),
            Err(AuthError::UserAlreadyExists) => {
                errors.add("username", "A user with that username already exists.");
            }
            Err(AuthError::WeakPassword(msg)) => errors.add("password", msg),
            Err(e) => return Err(e.into()),
        }
    } else {
        errors.add("password_confirm", "The two password fields didn't match.");
    }

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        RegisterTemplate {
            page: Page::load(&session, None).await,
            username: form.username.trim().to_string(),
            next: next.to_string(),
            errors,
        },
    )
        .into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Result<Response, AppError> {
    clear_current_user(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    push_flash(&session, FlashMessage::info("You have been logged out.")).await;
    Ok(Redirect::to("/auth/login").into_response())
}

// =============================================================================
// Helpers
// =============================================================================

async fn start_session(session: &Session, user: &User) -> Result<(), AppError> {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, user.username.as_str());
    Ok(())
}

/// Accept a post-login target only if it is a path on this site.
///
/// Protocol-relative (`//host`) and backslash tricks (`/\host`) are refused.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    is_local.then_some(next)
}
