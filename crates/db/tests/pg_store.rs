//! PostgreSQL store tests.
//!
//! These need a reachable database (`DATABASE_URL`); run them with
//! `cargo test -p todolist-db -- --ignored`.

use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;
use todolist_core::entity::Entity;
use todolist_core::error::CoreError;
use todolist_core::filter::{Filter, Where};
use todolist_db::models::todo::{CreateTodo, Todo, UpdateTodo};
use todolist_db::models::todo_list::{CreateTodoList, TodoList};
use todolist_db::store::{EntityStore, PgStore, StoreError};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn crud_round_trip(pool: PgPool) {
    let store = PgStore::<TodoList>::new(pool);

    let created = store
        .create(&CreateTodoList::titled("Groceries"))
        .await
        .unwrap();
    assert_eq!(store.find_by_id(created.id).await.unwrap(), created);

    store
        .replace_by_id(created.id, &CreateTodoList::titled("Shopping"))
        .await
        .unwrap();
    assert_eq!(store.find_by_id(created.id).await.unwrap().title, "Shopping");

    store.delete_by_id(created.id).await.unwrap();
    assert_matches!(
        store.find_by_id(created.id).await,
        Err(StoreError::Core(CoreError::NotFound { entity: "TodoList", .. }))
    );
    assert_matches!(
        store.delete_by_id(created.id).await,
        Err(StoreError::Core(CoreError::NotFound { .. }))
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn filters_match_memory_semantics(pool: PgPool) {
    let store = PgStore::<Todo>::new(pool);
    for (title, list) in [("Buy milk", Some(1)), ("Walk dog", Some(1)), ("Call mom", None)] {
        store
            .create(&CreateTodo {
                todo_list_id: list,
                ..CreateTodo::titled(title)
            })
            .await
            .unwrap();
    }

    let filter = Filter::parse(
        Todo::FIELDS,
        &json!({"where": {"todoListId": {"neq": 1}}}),
    )
    .unwrap();
    let found = store.find(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Call mom");

    let filter = Filter::parse(Todo::FIELDS, &json!({"order": "todoListId DESC"})).unwrap();
    let titles: Vec<_> = store
        .find(&filter)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Buy milk", "Walk dog", "Call mom"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn bulk_operations_report_counts(pool: PgPool) {
    let store = PgStore::<Todo>::new(pool);
    for title in ["a", "b", "c"] {
        store.create(&CreateTodo::titled(title)).await.unwrap();
    }

    let patch = UpdateTodo {
        is_complete: Some(Some(true)),
        ..UpdateTodo::default()
    };
    let some = Where::parse(Todo::FIELDS, &json!({"title": {"inq": ["a", "b"]}})).unwrap();
    assert_eq!(store.update_all(&patch, Some(&some)).await.unwrap(), 2);

    let done = Where::parse(Todo::FIELDS, &json!({"isComplete": true})).unwrap();
    assert_eq!(store.count(Some(&done)).await.unwrap(), 2);

    assert_eq!(store.update_all(&UpdateTodo::default(), None).await.unwrap(), 3);
    assert_eq!(store.delete_all(None).await.unwrap(), 3);
    assert_eq!(store.count(None).await.unwrap(), 0);

    store.ping().await.unwrap();
}
