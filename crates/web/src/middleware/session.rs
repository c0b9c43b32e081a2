//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tl_session";

/// Session expiry time in seconds (14 days).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The session table is created by `tl-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AppConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer_with_store(PostgresStore::new(pool.clone()), config.is_secure())
}

/// Build the session layer around any store.
///
/// SameSite=Lax keeps the cookie off cross-site POSTs, which is what stands
/// between the form endpoints and cross-site request forgery.
#[must_use]
pub fn session_layer_with_store<S: SessionStore + Clone>(
    store: S,
    secure: bool,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
