//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Redirect to /lists/
//!
//! # Auth
//! GET  /auth/login                         - Login page
//! POST /auth/login                         - Login action (rate limited)
//! GET  /auth/register                      - Register page
//! POST /auth/register                      - Register action (rate limited)
//! POST /auth/logout                        - Logout action
//!
//! # Lists (requires auth)
//! GET  /lists/                             - Lists owned by the requester
//! GET  /lists/new/                         - New list form
//! POST /lists/new/                         - Create list
//! GET  /lists/{list_id}/                   - List detail with its tasks
//!
//! # Tasks (requires auth, parent list must be owned)
//! GET  /lists/{list_id}/tasks/new/                 - New task form
//! POST /lists/{list_id}/tasks/new/                 - Create task
//! GET  /lists/{list_id}/tasks/{task_id}/edit/      - Edit task form
//! POST /lists/{list_id}/tasks/{task_id}/edit/      - Update task
//! GET  /lists/{list_id}/tasks/{task_id}/delete/    - Delete confirmation
//! POST /lists/{list_id}/tasks/{task_id}/delete/    - Delete task
//! ```

pub mod auth;
pub mod lists;
pub mod tasks;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::config::AppConfig;
use crate::middleware::{auth_rate_limiter, take_flashes};
use crate::models::{CurrentUser, FlashMessage};
use crate::state::AppState;

/// Data every page layout needs: who is logged in and pending flashes.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<FlashMessage>,
}

impl Page {
    /// Build the layout context, draining queued flash messages.
    pub async fn load(session: &Session, user: Option<CurrentUser>) -> Self {
        Self {
            user,
            flashes: take_flashes(session).await,
        }
    }
}

/// Create the auth routes router.
///
/// Login and registration POSTs share one per-client limiter.
pub fn auth_routes(config: &AppConfig) -> Router<AppState> {
    let limiter = auth_rate_limiter(&config.trusted_proxies);

    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(limiter.clone())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(limiter)),
        )
        .route("/logout", post(auth::logout))
}

/// Create the list and task routes router.
///
/// Paths are spelled out in full rather than nested so the trailing slash of
/// `/lists/` is part of the route itself.
pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/lists/", get(lists::index))
        .route("/lists/new/", get(lists::new).post(lists::create))
        .route("/lists/{list_id}/", get(lists::show))
        .route(
            "/lists/{list_id}/tasks/new/",
            get(tasks::new).post(tasks::create),
        )
        .route(
            "/lists/{list_id}/tasks/{task_id}/edit/",
            get(tasks::edit).post(tasks::update),
        )
        .route(
            "/lists/{list_id}/tasks/{task_id}/delete/",
            get(tasks::confirm_delete).post(tasks::delete),
        )
}

/// Create all routes for the application.
pub fn routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/lists/") }))
        .nest("/auth", auth_routes(config))
        .merge(list_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::Body,
        Extension,
        extract::ConnectInfo,
        http::{Request, StatusCode, header},
        response::IntoResponse,
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use tasklists_core::{UserId, Username};

    use super::*;
    use crate::config::LogFormat;
    use crate::middleware::session::session_layer_with_store;
    use crate::middleware::set_current_user;

    /// Router backed by a pool that never connects, so any test that reaches
    /// the database fails loudly instead of passing by accident.
    fn test_app() -> Router {
        let config = AppConfig {
            database_url: "postgres://nobody@127.0.0.1:1/none".to_string().into(),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            trusted_proxies: Vec::new(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let router = routes(&config);
        let state = AppState::new(config, pool);

        Router::new()
            .merge(router)
            .route("/test/login", get(test_login))
            .layer(session_layer_with_store(MemoryStore::default(), false))
            .with_state(state)
            .layer(Extension(ConnectInfo(SocketAddr::from((
                [192, 0, 2, 10],
                51234,
            )))))
    }

    async fn test_login(session: Session) -> impl IntoResponse {
        let user = CurrentUser {
            id: UserId::new(1),
            username: Username::parse("alice").unwrap(),
        };
        set_current_user(&session, &user).await.unwrap();
        StatusCode::NO_CONTENT
    }

    async fn login_cookie(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::get("/test/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_lists() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/lists/");
    }

    #[tokio::test]
    async fn test_unauthenticated_requests_redirect_to_login() {
        let app = test_app();
        for (method, uri) in [
            ("GET", "/lists/"),
            ("GET", "/lists/new/"),
            ("POST", "/lists/new/"),
            ("GET", "/lists/7/"),
            ("GET", "/lists/7/tasks/new/"),
            ("POST", "/lists/7/tasks/new/"),
            ("GET", "/lists/7/tasks/9/edit/"),
            ("POST", "/lists/7/tasks/9/edit/"),
            ("GET", "/lists/7/tasks/9/delete/"),
            ("POST", "/lists/7/tasks/9/delete/"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=x&title=y"))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{method} {uri}");
            let location = response.headers()[header::LOCATION].to_str().unwrap();
            assert_eq!(
                location,
                format!("/auth/login?next={}", urlencoding::encode(uri)),
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_ids_are_not_found() {
        let app = test_app();
        let cookie = login_cookie(&app).await;

        for uri in [
            "/lists/abc/",
            "/lists/abc/tasks/new/",
            "/lists/1/tasks/xyz/edit/",
            "/lists/1/tasks/99999999999/delete/",
        ] {
            let request = Request::get(uri)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body_text(response).await, "Not found");
        }
    }

    #[tokio::test]
    async fn test_new_list_form_renders() {
        let app = test_app();
        let cookie = login_cookie(&app).await;

        let response = app
            .oneshot(
                Request::get("/lists/new/")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(r#"name="name""#));
        assert!(body.contains("alice"));
    }

    #[tokio::test]
    async fn test_blank_list_name_rerenders_with_422() {
        let app = test_app();
        let cookie = login_cookie(&app).await;

        let response = app
            .oneshot(
                Request::post("/lists/new/")
                    .header(header::COOKIE, &cookie)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=+++"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("This field is required."));
    }

    #[tokio::test]
    async fn test_login_limit_ignores_spoofed_forwarded_for() {
        let app = test_app();

        let mut statuses = Vec::new();
        for attempt in 0..6 {
            let request = Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("x-forwarded-for", format!("203.0.113.{attempt}"))
                .body(Body::from("username=alice&password=guess"))
                .unwrap();
            statuses.push(app.clone().oneshot(request).await.unwrap().status());
        }

        assert!(
            statuses[..5]
                .iter()
                .all(|s| *s != StatusCode::TOO_MANY_REQUESTS)
        );
        assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_login_page_renders_next() {
        let response = test_app()
            .oneshot(
                Request::get("/auth/login?next=%2Flists%2F3%2F")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(r#"name="next" value="/lists/3/""#));
    }

    #[tokio::test]
    async fn test_login_page_redirects_when_logged_in() {
        let app = test_app();
        let cookie = login_cookie(&app).await;

        let response = app
            .oneshot(
                Request::get("/auth/login?next=//evil.example/")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/lists/");
    }
}
