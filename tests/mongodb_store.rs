//! 网络文档存储测试
//!
//! 需要本地 MongoDB：`cargo test --features mongodb-support -- --ignored`
//! 地址可通过 `RAT_SCHEMA_MONGO_HOST` 覆盖

#![cfg(feature = "mongodb-support")]

use rat_schema::*;
use std::sync::Arc;

async fn database() -> Arc<DatabaseHandler> {
    rat_schema::init();
    let host = std::env::var("RAT_SCHEMA_MONGO_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let config = networked_config(host, 27017, "rat_schema_test", None).unwrap();
    DatabaseHandler::connect(config).await.expect("MongoDB连接失败")
}

async fn schema(collection: &str) -> Arc<Schema> {
    let schema = Schema::builder(collection)
        .field("name", string_field().build().unwrap())
        .field("rank", number_field().required(false).build().unwrap())
        .field("owner", any_field().required(false).build().unwrap())
        .database(database().await)
        .build()
        .unwrap();
    schema.drop_collection().await.unwrap();
    schema
}

#[tokio::test]
#[ignore]
async fn object_ids_are_canonical_strings() {
    let people = schema("people").await;

    let id = people.create(document! { "name" => "John" }).save().await.unwrap();
    let hex = match &id {
        IdType::String(hex) => hex.clone(),
        other => panic!("unexpected id: {other:?}"),
    };
    assert_eq!(hex.len(), 24);

    let by_text = people.find_one(document! { "_id" => hex.as_str() }).await.unwrap();
    assert!(by_text.is_some());

    let mut pet = people.create(document! { "name" => "Rex", "owner" => SchemaId::single(id.clone()) });
    pet.save().await.unwrap();
    let pet = people
        .find_one(document! { "owner" => SchemaId::single(id.clone()) })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pet.get("owner"), Some(&DataValue::from(SchemaId::single(id))));

    assert!(people.drop_collection().await.unwrap());
}

#[tokio::test]
#[ignore]
async fn native_ordering_and_pagination() {
    let ranked = schema("ranked").await;
    for (name, rank) in [("c", 3), ("a", 1), ("b", 2)] {
        ranked
            .create(document! { "name" => name, "rank" => rank })
            .save()
            .await
            .unwrap();
    }

    let page = ranked
        .find(
            document! {},
            FindOptions::new().order_by("rank").reverse(true).offset(1).limit(1),
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].get("name"), Some(&DataValue::from("b")));

    assert_eq!(
        ranked.count(document! { "rank" => document! { "$gte" => 2 } }).await.unwrap(),
        2
    );
    ranked.drop_collection().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn indexes_can_be_created_and_dropped() {
    let indexed = schema("indexed").await;
    indexed.create(document! { "name" => "x" }).save().await.unwrap();

    let name = indexed
        .create_index(
            &[IndexField::asc("name")],
            IndexOptions::new().name("name_unique").unique(true),
        )
        .await
        .unwrap();
    assert_eq!(name, "name_unique");

    let duplicate = indexed.create(document! { "name" => "x" }).save().await;
    assert!(duplicate.is_err());

    indexed.drop_index(&name).await.unwrap();
    indexed.drop_collection().await.unwrap();
}
