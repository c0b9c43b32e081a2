//! Integration tests for Tasklists.
//!
//! # Running Tests
//!
//! ```bash
//! # Database-backed tests: sqlx creates a scratch database per test
//! DATABASE_URL=postgres://localhost/tasklists_test \
//!     cargo test -p tasklists-integration-tests -- --ignored
//!
//! # End-to-end tests against a running server
//! TASKLISTS_TEST_URL=http://localhost:8000 \
//!     cargo test -p tasklists-integration-tests --test end_to_end -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `repositories` - Ownership filter, cascades and ordering against `PostgreSQL`
//! - `routes` - The full router driven in-process against `PostgreSQL`
//! - `end_to_end` - HTTP scenarios against a running server
//!
//! This library holds the fixtures the test files share.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::Router;
use axum::extract::connect_info::MockConnectInfo;
use secrecy::SecretString;
use sqlx::PgPool;
use tower_sessions::MemoryStore;

use tasklists_core::{ListName, TaskTitle, Username};
use tasklists_web::config::{AppConfig, LogFormat};
use tasklists_web::db::{ListRepository, TaskRepository, UserRepository};
use tasklists_web::middleware::session::session_layer_with_store;
use tasklists_web::models::{NewList, NewTask, Task, TodoList, User};
use tasklists_web::services::auth::hash_password;
use tasklists_web::state::AppState;

/// Password given to every fixture user.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Configuration for an in-process app. Only the pool is real.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://unused".to_string()),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 8000,
        base_url: "http://localhost:8000".to_string(),
        trusted_proxies: Vec::new(),
        log_format: LogFormat::Text,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

/// Peer address every in-process request appears to come from.
pub const TEST_PEER: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4)), 40000);

/// The application router over `pool`, with in-memory sessions.
#[must_use]
pub fn test_app(pool: PgPool) -> Router {
    let config = test_config();
    tasklists_web::routes::routes(&config)
        .layer(session_layer_with_store(MemoryStore::default(), false))
        .with_state(AppState::new(config, pool))
        .layer(MockConnectInfo(TEST_PEER))
}

/// Insert a user with [`TEST_PASSWORD`].
///
/// # Panics
///
/// Panics if the username is invalid or the insert fails.
pub async fn create_user(pool: &PgPool, username: &str) -> User {
    let username = Username::parse(username).expect("valid username");
    let hash = hash_password(TEST_PASSWORD).expect("hash password");
    UserRepository::new(pool)
        .create_with_password(&username, &hash)
        .await
        .expect("create user")
}

/// Insert a list owned by `owner`.
///
/// # Panics
///
/// Panics if the name is invalid or the insert fails.
pub async fn create_list(pool: &PgPool, owner: &User, name: &str) -> TodoList {
    let new_list = NewList {
        name: ListName::parse(name).expect("valid list name"),
    };
    ListRepository::new(pool)
        .create(owner.id, &new_list)
        .await
        .expect("create list")
}

/// Insert an incomplete task with no due date.
///
/// # Panics
///
/// Panics if the title is invalid or the insert fails.
pub async fn create_task(pool: &PgPool, list: &TodoList, title: &str) -> Task {
    let new_task = NewTask {
        title: TaskTitle::parse(title).expect("valid task title"),
        description: String::new(),
        completed: false,
        due_date: None,
    };
    TaskRepository::new(pool)
        .create(list, &new_task)
        .await
        .expect("create task")
}

/// Count rows in a `tasklists` table.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM tasklists.{table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
