//! Authentication middleware and extractors.
//!
//! `RequireAuth` is the gate in front of every list and task handler. It
//! implements `FromRequestParts`, so it runs before any body extractor: an
//! unauthenticated form POST is turned away without its body being read.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires an authenticated user.
///
/// If nobody is logged in, the request is redirected to the login page with
/// the original path in `next`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection returned when authentication is required but missing.
#[derive(Debug)]
pub struct AuthRejection {
    next: String,
}

impl AuthRejection {
    /// Where the client is sent.
    #[must_use]
    pub fn location(&self) -> String {
        format!("/auth/login?next={}", urlencoding::encode(&self.next))
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(&self.location()).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let reject = || AuthRejection {
            next: parts.uri.path().to_string(),
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or_else(reject)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(reject)?;

        tracing::Span::current().record("user_id", user.id.as_i32());

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_location_encodes_next() {
        let rejection = AuthRejection {
            next: "/lists/3/tasks/new/".to_string(),
        };
        assert_eq!(
            rejection.location(),
            "/auth/login?next=%2Flists%2F3%2Ftasks%2Fnew%2F"
        );
    }
}
