//! MongoDB集合和索引管理

use crate::adapter::mongodb::MongoAdapter;
use crate::error::SchemaResult;
use crate::types::{IndexField, IndexOptions};
use mongodb::bson::{doc, Document as BsonDocument};
use mongodb::{Database, IndexModel};
use rat_logger::{debug, info};

/// 创建索引，返回索引名
pub(crate) async fn create_index(
    adapter: &MongoAdapter,
    database: &Database,
    collection: &str,
    fields: &[IndexField],
    options: &IndexOptions,
) -> SchemaResult<String> {
    if fields.is_empty() {
        return Err(crate::schema_error!(query, "索引至少需要一个字段"));
    }

    let mut keys = BsonDocument::new();
    for field in fields {
        keys.insert(field.field.clone(), field.direction.as_i32());
    }

    let mut index_options = mongodb::options::IndexOptions::default();
    index_options.name = options.name.clone();
    index_options.unique = Some(options.unique);
    index_options.sparse = Some(options.sparse);

    let model = IndexModel::builder()
        .keys(keys)
        .options(index_options)
        .build();

    let result = adapter
        .get_collection(database, collection)?
        .create_index(model, None)
        .await?;
    info!("MongoDB创建索引: {}.{}", collection, result.index_name);
    Ok(result.index_name)
}

/// 删除索引
pub(crate) async fn drop_index(
    adapter: &MongoAdapter,
    database: &Database,
    collection: &str,
    name: &str,
) -> SchemaResult<()> {
    adapter
        .get_collection(database, collection)?
        .drop_index(name, None)
        .await?;
    info!("MongoDB删除索引: {}.{}", collection, name);
    Ok(())
}

/// 删除集合，返回删除前集合是否存在
pub(crate) async fn drop_collection(
    adapter: &MongoAdapter,
    database: &Database,
    collection: &str,
) -> SchemaResult<bool> {
    let handle = adapter.get_collection(database, collection)?;
    let existing = database
        .list_collection_names(doc! { "name": collection })
        .await?;
    let existed = !existing.is_empty();
    debug!("MongoDB集合 {} 存在: {}", collection, existed);

    handle.drop(None).await?;
    Ok(existed)
}
