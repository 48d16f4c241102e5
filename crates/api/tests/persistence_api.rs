//! The file-backed memory data source keeps data across restarts.

mod common;

use common::{body_json, build_app, create, get};
use serde_json::json;
use todolist_db::datasource::DataSource;
use todolist_db::service::DeletePolicy;

#[tokio::test]
async fn data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let source = DataSource::Memory {
        data_dir: Some(dir.path().to_path_buf()),
    };

    let list_id = {
        let app = build_app(source.connect(DeletePolicy::Orphan).await.unwrap());
        let list = create(app.clone(), "/api/v1/todo-lists", json!({"title": "Groceries"})).await;
        let list_id = list["id"].as_i64().unwrap();
        create(
            app,
            &format!("/api/v1/todo-lists/{list_id}/todos"),
            json!({"title": "Buy milk"}),
        )
        .await;
        list_id
    };

    let app = build_app(source.connect(DeletePolicy::Orphan).await.unwrap());
    let json = body_json(get(app, &format!("/api/v1/todo-lists/{list_id}/todos")).await).await;
    assert_eq!(json["data"][0]["title"], "Buy milk");
    assert_eq!(json["data"][0]["todoListId"], list_id);
}
