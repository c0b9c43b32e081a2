//! Database tests for the ownership filter, cascades and ordering.
//!
//! Each test gets a fresh database with the migrations applied.
//! Run with: `DATABASE_URL=... cargo test -p tasklists-integration-tests -- --ignored`

use std::time::Instant;

use sqlx::PgPool;

use tasklists_core::{ListId, ListName, TaskId, TaskTitle, UserId};
use tasklists_integration_tests::{count_rows, create_list, create_task, create_user};
use tasklists_web::db::{ListRepository, RepositoryError, TaskRepository, UserRepository};
use tasklists_web::error::AppError;
use tasklists_web::forms::{ListForm, TaskForm};
use tasklists_web::models::TaskChanges;
use tasklists_web::services::{AuthError, AuthService, Ownership};

// ============================================================================
// Authorization filter
// ============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_owner_resolves_own_list_and_task(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    let task = create_task(&pool, &list, "Buy milk").await;

    let ownership = Ownership::new(&pool);
    let found = ownership.list(alice.id, list.id).await.expect("own list");
    assert_eq!(found, list);
    let found = ownership
        .task(alice.id, list.id, task.id)
        .await
        .expect("own task");
    assert_eq!(found, task);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_foreign_and_missing_entities_are_indistinguishable(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    let task = create_task(&pool, &list, "Buy milk").await;

    let ownership = Ownership::new(&pool);

    let foreign = ownership.list(bob.id, list.id).await.unwrap_err();
    let missing = ownership.list(bob.id, ListId::new(999_999)).await.unwrap_err();
    assert!(matches!(foreign, AppError::NotFound(_)));
    assert_eq!(foreign.to_string(), missing.to_string());

    let foreign = ownership.task(bob.id, list.id, task.id).await.unwrap_err();
    let missing = ownership
        .task(bob.id, list.id, TaskId::new(999_999))
        .await
        .unwrap_err();
    assert!(matches!(foreign, AppError::NotFound(_)));
    assert_eq!(foreign.to_string(), missing.to_string());
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_task_must_match_list_in_path(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let groceries = create_list(&pool, &alice, "Groceries").await;
    let chores = create_list(&pool, &alice, "Chores").await;
    let task = create_task(&pool, &groceries, "Buy milk").await;

    // Right owner, wrong parent list.
    let err = Ownership::new(&pool)
        .task(alice.id, chores.id, task.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_non_owner_cannot_write(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    let task = create_task(&pool, &list, "Buy milk").await;
    let tasks = TaskRepository::new(&pool);

    let changes = TaskChanges {
        title: TaskTitle::parse("Hijacked").expect("valid title"),
        description: String::new(),
        due_date: None,
    };
    let err = tasks
        .update(task.id, list.id, bob.id, &changes)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let deleted = tasks
        .delete_owned(task.id, list.id, bob.id)
        .await
        .expect("delete query");
    assert!(!deleted);

    // A list value forged with the wrong owner still cannot receive tasks.
    let mut forged = list.clone();
    forged.owner = bob.id;
    let new_task = TaskForm {
        title: "Sneaky".to_string(),
        ..TaskForm::default()
    }
    .validate()
    .expect("valid form");
    let err = tasks.create(&forged, &new_task).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let unchanged = tasks
        .get_owned(task.id, list.id, alice.id)
        .await
        .expect("lookup")
        .expect("task still exists");
    assert_eq!(unchanged.title.as_str(), "Buy milk");
    assert_eq!(count_rows(&pool, "task").await, 1);
}

// ============================================================================
// Lists
// ============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_list_index_is_scoped_and_newest_first(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    create_list(&pool, &alice, "Chores").await;
    create_list(&pool, &bob, "Bob's list").await;
    let groceries = create_list(&pool, &alice, "Groceries").await;

    let lists = ListRepository::new(&pool)
        .list_for_owner(alice.id)
        .await
        .expect("list lists");
    let names: Vec<&str> = lists.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["Groceries", "Chores"]);
    assert_eq!(lists[0].id, groceries.id);
    assert!(lists.iter().all(|l| l.owner == alice.id));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_blank_list_name_persists_nothing(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;

    let form = ListForm {
        name: "   ".to_string(),
    };
    assert!(form.validate().is_err());

    // The table refuses blank names even if validation were skipped.
    let raw = sqlx::query("INSERT INTO tasklists.list (owner_id, name) VALUES ($1, '  ')")
        .bind(alice.id)
        .execute(&pool)
        .await;
    assert!(raw.is_err());

    assert_eq!(count_rows(&pool, "list").await, 0);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_list_owner_is_set_and_required(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    assert_eq!(list.owner, alice.id);

    let raw = sqlx::query("INSERT INTO tasklists.list (owner_id, name) VALUES (NULL, 'Orphan')")
        .execute(&pool)
        .await;
    assert!(raw.is_err());

    let new_list = tasklists_web::models::NewList {
        name: ListName::parse("Ghost").expect("valid name"),
    };
    let err = ListRepository::new(&pool)
        .create(UserId::new(999_999), &new_list)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

// ============================================================================
// Tasks
// ============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_201_character_title_persists_nothing(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let list = create_list(&pool, &alice, "Groceries").await;

    let form = TaskForm {
        title: "t".repeat(201),
        ..TaskForm::default()
    };
    assert!(form.validate().is_err());

    let raw = sqlx::query("INSERT INTO tasklists.task (list_id, title) VALUES ($1, $2)")
        .bind(list.id)
        .bind("t".repeat(201))
        .execute(&pool)
        .await;
    assert!(raw.is_err());

    assert_eq!(count_rows(&pool, "task").await, 0);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_tasks_ordered_incomplete_first_then_recent(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    let tasks = TaskRepository::new(&pool);

    let done = TaskForm {
        title: "Buy bread".to_string(),
        completed: Some("on".to_string()),
        ..TaskForm::default()
    }
    .validate()
    .expect("valid form");
    tasks.create(&list, &done).await.expect("create done task");
    let older = create_task(&pool, &list, "Buy milk").await;
    create_task(&pool, &list, "Buy eggs").await;

    // Touching the older task moves it to the front of the open tasks.
    let changes = TaskChanges {
        title: older.title.clone(),
        description: "semi-skimmed".to_string(),
        due_date: None,
    };
    tasks
        .update(older.id, list.id, alice.id, &changes)
        .await
        .expect("update");

    let ordered = tasks
        .list_for_list(list.id, alice.id)
        .await
        .expect("list tasks");
    let titles: Vec<&str> = ordered.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Buy milk", "Buy eggs", "Buy bread"]);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_edit_updates_fields_but_not_completion(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    let task = create_task(&pool, &list, "Buy milk").await;
    assert!(!task.completed);
    assert_eq!(task.due_date, None);

    let changes = TaskChanges {
        title: TaskTitle::parse("Buy oat milk").expect("valid title"),
        description: "the barista one".to_string(),
        due_date: chrono::NaiveDate::from_ymd_opt(2026, 11, 2),
    };
    let updated = TaskRepository::new(&pool)
        .update(task.id, list.id, alice.id, &changes)
        .await
        .expect("update");

    assert_eq!(updated.title.as_str(), "Buy oat milk");
    assert_eq!(updated.description, "the barista one");
    assert_eq!(updated.due_date, chrono::NaiveDate::from_ymd_opt(2026, 11, 2));
    assert!(!updated.completed);
    assert_eq!(updated.list_id, task.list_id);
    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at > task.updated_at);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_delete_twice_is_not_found_not_error(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    let task = create_task(&pool, &list, "Buy milk").await;
    let tasks = TaskRepository::new(&pool);

    assert!(
        tasks
            .delete_owned(task.id, list.id, alice.id)
            .await
            .expect("first delete")
    );
    assert!(
        !tasks
            .delete_owned(task.id, list.id, alice.id)
            .await
            .expect("second delete")
    );

    let err = Ownership::new(&pool)
        .task(alice.id, list.id, task.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ============================================================================
// Cascades
// ============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_deleting_list_deletes_its_tasks(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let groceries = create_list(&pool, &alice, "Groceries").await;
    let chores = create_list(&pool, &alice, "Chores").await;
    let milk = create_task(&pool, &groceries, "Buy oat milk").await;
    create_task(&pool, &chores, "Vacuum").await;

    sqlx::query("DELETE FROM tasklists.list WHERE id = $1")
        .bind(groceries.id)
        .execute(&pool)
        .await
        .expect("delete list");

    let err = Ownership::new(&pool)
        .task(alice.id, groceries.id, milk.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(count_rows(&pool, "task").await, 1);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_deleting_user_deletes_lists_and_tasks(pool: PgPool) {
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let list = create_list(&pool, &alice, "Groceries").await;
    create_task(&pool, &list, "Buy milk").await;
    let bobs = create_list(&pool, &bob, "Bob's list").await;
    create_task(&pool, &bobs, "Bob's task").await;

    let users = UserRepository::new(&pool);
    assert!(users.delete(alice.id).await.expect("delete user"));

    assert_eq!(count_rows(&pool, "list").await, 1);
    assert_eq!(count_rows(&pool, "task").await, 1);

    let summaries = users.list_with_list_counts().await.expect("summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].user.id, bob.id);
    assert_eq!(summaries[0].list_count, 1);
}

// ============================================================================
// Login
// ============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires DATABASE_URL pointing at PostgreSQL"]
async fn test_unknown_username_pays_for_a_password_check(pool: PgPool) {
    create_user(&pool, "alice").await;
    let auth = AuthService::new(&pool);

    // Warm the pool and the lazily built comparison hash.
    let _ = auth.login_with_password("nobody", "whatever1").await;

    let started = Instant::now();
    let wrong_password = auth.login_with_password("alice", "not the password").await;
    let wrong_password_time = started.elapsed();

    let started = Instant::now();
    let unknown_user = auth.login_with_password("mallory", "not the password").await;
    let unknown_user_time = started.elapsed();

    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
    assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    assert!(
        unknown_user_time * 3 >= wrong_password_time,
        "unknown user took {unknown_user_time:?}, wrong password {wrong_password_time:?}"
    );
}
