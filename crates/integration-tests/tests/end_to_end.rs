//! End-to-end scenarios against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`tl-cli migrate`)
//! - The web server running (`cargo run -p tasklists-web`)
//!
//! Usernames are randomised so the tests can run repeatedly against the
//! same database.

use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use uuid::Uuid;

/// Base URL of the server under test (configurable via environment).
fn base_url() -> String {
    std::env::var("TASKLISTS_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A cookie-keeping client that does not follow redirects, so each
/// redirect can be asserted.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}

/// Register a fresh account and return a client logged in as it.
async fn registered_client() -> Client {
    let client = client();
    let username = format!("e2e-{}", Uuid::new_v4().simple());
    let password = "end to end password";

    let response = client
        .post(format!("{}/auth/register", base_url()))
        .form(&[
            ("username", username.as_str()),
            ("password", password),
            ("password_confirm", password),
        ])
        .send()
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    client
}

/// Create a list and return its detail path (`/lists/{id}/`).
async fn create_list(client: &Client, name: &str) -> String {
    let response = client
        .post(format!("{}/lists/new/", base_url()))
        .form(&[("name", name)])
        .send()
        .await
        .expect("create list");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/lists/");

    let index = client
        .get(format!("{}/lists/", base_url()))
        .send()
        .await
        .expect("list index")
        .text()
        .await
        .expect("index body");

    // The newest list comes first.
    first_list_path(&index).expect("list link on index")
}

fn first_list_path(html: &str) -> Option<String> {
    let start = html.find("<ul class=\"lists\">")?;
    let rest = html.get(start..)?;
    let href = rest.find("href=\"/lists/")? + "href=\"".len();
    let rest = rest.get(href..)?;
    let end = rest.find('"')?;
    rest.get(..end).map(str::to_string)
}

/// First `{prefix}{id}{suffix}` path in the page.
fn link_ending_with(html: &str, prefix: &str, suffix: &str) -> Option<String> {
    html.match_indices(prefix).find_map(|(start, _)| {
        let rest = html.get(start + prefix.len()..)?;
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let after = rest.get(digits..)?;
        (digits > 0 && after.starts_with(suffix))
            .then(|| format!("{prefix}{}{suffix}", rest.get(..digits).unwrap_or_default()))
    })
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_health_endpoints() {
    let client = client();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("readiness");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_anonymous_is_sent_to_login() {
    let response = client()
        .get(format!("{}/lists/", base_url()))
        .send()
        .await
        .expect("lists");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?next=%2Flists%2F");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_groceries_scenario() {
    let alice = registered_client().await;
    let bob = registered_client().await;

    let groceries = create_list(&alice, "Groceries").await;

    // Bob cannot see Alice's list.
    let response = bob
        .get(format!("{}{groceries}", base_url()))
        .send()
        .await
        .expect("bob views list");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice adds a task.
    let response = alice
        .post(format!("{}{groceries}tasks/new/", base_url()))
        .form(&[("title", "Buy milk"), ("description", ""), ("due_date", "")])
        .send()
        .await
        .expect("create task");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), groceries);

    let detail = alice
        .get(format!("{}{groceries}", base_url()))
        .send()
        .await
        .expect("detail")
        .text()
        .await
        .expect("detail body");
    assert!(detail.contains("Buy milk"));

    let edit_path = link_ending_with(&detail, &format!("{groceries}tasks/"), "/edit/")
        .expect("edit link");
    let delete_path = edit_path.replace("/edit/", "/delete/");

    // Edit the title.
    let response = alice
        .post(format!("{}{edit_path}", base_url()))
        .form(&[("title", "Buy oat milk"), ("description", ""), ("due_date", "")])
        .send()
        .await
        .expect("edit task");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Bob cannot delete it.
    let response = bob
        .post(format!("{}{delete_path}", base_url()))
        .send()
        .await
        .expect("bob deletes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice deletes it, twice.
    let response = alice
        .post(format!("{}{delete_path}", base_url()))
        .send()
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = alice
        .post(format!("{}{delete_path}", base_url()))
        .send()
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
