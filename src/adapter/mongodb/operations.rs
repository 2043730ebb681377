use crate::adapter::{DatabaseAdapter, DatabaseConnection};
use crate::error::SchemaResult;
use crate::normalizer::IdentifierCodec;
use crate::types::*;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use rat_logger::{debug, info};

use super::adapter::MongoAdapter;
use super::query as mongo_query;
use super::schema as mongo_schema;
use super::utils::{bson_to_data_value, bson_to_document, data_value_to_bson, document_to_bson};

#[async_trait]
impl DatabaseAdapter for MongoAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::Networked
    }

    fn identifier_codec(&self) -> &dyn IdentifierCodec {
        &self.codec
    }

    fn supports_native_ordering(&self) -> bool {
        true
    }

    async fn acquire(&self) -> SchemaResult<DatabaseConnection> {
        // 驱动内部维护连接池，会话持有数据库句柄即可
        Ok(DatabaseConnection::MongoDB(self.database.clone()))
    }

    async fn close(&self) {
        info!("关闭MongoDB客户端");
        self.client.clone().shutdown().await;
    }

    async fn find(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
        options: &FindOptions,
    ) -> SchemaResult<Vec<Document>> {
        let database = self.mongo_database(connection)?;
        let handle = self.get_collection(database, collection)?;
        let filter = document_to_bson(query);
        debug!("MongoDB查询 {}: {:?}", collection, filter);

        let mut cursor = handle
            .find(filter, mongo_query::build_find_options(options))
            .await?;
        let mut results = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            results.push(bson_to_document(document));
        }
        Ok(results)
    }

    async fn delete(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
    ) -> SchemaResult<bool> {
        let database = self.mongo_database(connection)?;
        let result = self
            .get_collection(database, collection)?
            .delete_one(document_to_bson(query), None)
            .await?;
        debug!("MongoDB删除 {}: {} 条", collection, result.deleted_count);
        Ok(result.deleted_count == 1)
    }

    async fn update(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        document: &Document,
    ) -> SchemaResult<Option<Document>> {
        let id = match document.get(ID_FIELD) {
            Some(id @ DataValue::ObjectId(_)) => data_value_to_bson(id),
            other => {
                let shown = other.map(|v| v.to_string()).unwrap_or_default();
                return Err(crate::schema_error!(invalid_id, shown, self.codec.backend()));
            }
        };

        let database = self.mongo_database(connection)?;
        let result = self
            .get_collection(database, collection)?
            .replace_one(doc! { "_id": id }, document_to_bson(document), None)
            .await?;

        if result.matched_count == 1 {
            Ok(Some(document.clone()))
        } else {
            debug!("MongoDB更新未匹配任何文档: {}", collection);
            Ok(None)
        }
    }

    async fn insert(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        document: &Document,
    ) -> SchemaResult<Option<Document>> {
        let mut payload = document.clone();
        if matches!(payload.get(ID_FIELD), Some(DataValue::Null)) {
            payload.remove(ID_FIELD);
        }

        let database = self.mongo_database(connection)?;
        let result = self
            .get_collection(database, collection)?
            .insert_one(document_to_bson(&payload), None)
            .await?;

        let id = bson_to_data_value(result.inserted_id);
        debug!("MongoDB插入文档 {}: _id={}", collection, id);
        payload.insert(ID_FIELD.to_string(), id);
        Ok(Some(payload))
    }

    async fn distinct(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        field: &str,
    ) -> SchemaResult<Vec<DataValue>> {
        let database = self.mongo_database(connection)?;
        let values = self
            .get_collection(database, collection)?
            .distinct(field, None, None)
            .await?;
        Ok(values.into_iter().map(bson_to_data_value).collect())
    }

    async fn count(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
    ) -> SchemaResult<u64> {
        let database = self.mongo_database(connection)?;
        let count = self
            .get_collection(database, collection)?
            .count_documents(document_to_bson(query), None)
            .await?;
        Ok(count)
    }

    async fn create_index(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        fields: &[IndexField],
        options: &IndexOptions,
    ) -> SchemaResult<String> {
        let database = self.mongo_database(connection)?;
        mongo_schema::create_index(self, database, collection, fields, options).await
    }

    async fn drop_index(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        name: &str,
    ) -> SchemaResult<()> {
        let database = self.mongo_database(connection)?;
        mongo_schema::drop_index(self, database, collection, name).await
    }

    async fn drop_collection(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
    ) -> SchemaResult<bool> {
        let database = self.mongo_database(connection)?;
        mongo_schema::drop_collection(self, database, collection).await
    }
}
