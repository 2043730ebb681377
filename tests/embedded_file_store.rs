//! 文件型嵌入式存储测试

#![cfg(feature = "sqlite-support")]

use rat_schema::*;
use std::sync::Arc;

async fn notes(db: Arc<DatabaseHandler>) -> Arc<Schema> {
    Schema::builder("notes")
        .field("title", string_field().build().unwrap())
        .field("created", date_field().build().unwrap())
        .field("tags", list_field().required(false).build().unwrap())
        .database(db)
        .build()
        .unwrap()
}

#[test]
fn data_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("notes.db");
    let path = path.to_string_lossy().to_string();

    tokio_test::block_on(async {
        let created = chrono::Utc::now();

        let db = DatabaseHandler::connect(embedded_config(path.clone()).unwrap())
            .await
            .unwrap();
        let schema = notes(Arc::clone(&db)).await;
        let id = schema
            .create(document! {
                "title" => "first",
                "created" => created,
                "tags" => vec!["a", "b"],
            })
            .save()
            .await
            .unwrap();
        db.close().await;

        let db = DatabaseHandler::connect(embedded_config(path.clone()).unwrap())
            .await
            .unwrap();
        let schema = notes(Arc::clone(&db)).await;
        let note = schema.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(note.get("title"), Some(&DataValue::from("first")));
        assert_eq!(note.get("tags"), Some(&DataValue::from(vec!["a", "b"])));
        match note.get("created") {
            Some(DataValue::DateTimeUTC(stored)) => {
                assert_eq!(stored.timestamp_millis(), created.timestamp_millis())
            }
            other => panic!("日期未按原类型还原: {other:?}"),
        }
        db.close().await;
    });
}

#[tokio::test]
async fn config_file_drives_connection() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.db");
    let config_path = dir.path().join("db.json");

    let config = embedded_config(store.to_string_lossy().to_string()).unwrap();
    config.save_to_file(&config_path).unwrap();

    let loaded = DatabaseConfig::from_file(&config_path).unwrap();
    assert_eq!(loaded.backend_type(), BackendType::Embedded);

    let db = DatabaseHandler::connect(loaded).await.unwrap();
    assert_eq!(db.backend_type(), BackendType::Embedded);
    let schema = notes(db).await;
    assert_eq!(schema.count(document! {}).await.unwrap(), 0);
}

async fn notes_named(db: Arc<DatabaseHandler>, collection: &str) -> Arc<Schema> {
    Schema::builder(collection)
        .field("title", string_field().build().unwrap())
        .database(db)
        .build()
        .unwrap()
}

#[tokio::test]
async fn table_dropped_by_another_handler_is_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db").to_string_lossy().to_string();

    let first = DatabaseHandler::connect(embedded_config(path.clone()).unwrap())
        .await
        .unwrap();
    let second = DatabaseHandler::connect(embedded_config(path).unwrap())
        .await
        .unwrap();
    let writer = notes_named(Arc::clone(&first), "shared").await;
    let dropper = notes_named(Arc::clone(&second), "shared").await;

    writer.create(document! { "title" => "before" }).save().await.unwrap();
    assert!(dropper.drop_collection().await.unwrap());

    writer.create(document! { "title" => "after" }).save().await.unwrap();
    assert_eq!(writer.count(document! {}).await.unwrap(), 1);
    let found = writer.find(document! {}, FindOptions::new()).await.unwrap();
    assert_eq!(found[0].get("title"), Some(&DataValue::from("after")));

    assert!(dropper.drop_collection().await.unwrap());
    assert_eq!(writer.count(document! { "title" => "after" }).await.unwrap(), 0);

    first.close().await;
    second.close().await;
}

#[tokio::test]
async fn table_names_ignore_case() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cased.db").to_string_lossy().to_string();
    let db = DatabaseHandler::connect(embedded_config(path).unwrap())
        .await
        .unwrap();

    let lower = notes_named(Arc::clone(&db), "journal").await;
    let upper = notes_named(Arc::clone(&db), "Journal").await;

    lower.create(document! { "title" => "entry" }).save().await.unwrap();
    assert_eq!(upper.count(document! {}).await.unwrap(), 1);

    assert!(upper.drop_collection().await.unwrap());
    assert!(!lower.drop_collection().await.unwrap());
    assert_eq!(lower.count(document! {}).await.unwrap(), 0);

    db.close().await;
}
