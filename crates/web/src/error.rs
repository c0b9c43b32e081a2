//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Form validation failures are not
//! errors at this level: handlers re-render the form themselves.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found, or not owned by the requester.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

impl AppError {
    /// Whether this error is the server's fault (and worth reporting).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        ) || matches!(self, Self::Database(err) if !matches!(err, RepositoryError::NotFound))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidUsername(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        };

        // Not-found responses carry no detail: the same body goes out whether
        // the entity is missing or belongs to someone else.
        let message = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => {
                "Not found".to_string()
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid username or password".to_string(),
                AuthError::UserAlreadyExists => "That username is taken".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidUsername(e) => e.to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_string()
                }
            },
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
