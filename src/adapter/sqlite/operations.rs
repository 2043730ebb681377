use crate::adapter::{DatabaseAdapter, DatabaseConnection};
use crate::error::SchemaResult;
use crate::normalizer::IdentifierCodec;
use crate::types::*;
use async_trait::async_trait;
use rat_logger::{debug, info};

use super::adapter::SqliteAdapter;
use super::data_conversion::{decode_document, encode_document};
use super::query as sqlite_query;
use super::schema as sqlite_schema;

const BACKEND_NAME: &str = "embedded";

/// 在集合表上执行语句，表被其他连接删除时重建并重试一次
macro_rules! with_table {
    ($adapter:expr, $conn:expr, $collection:expr, |$table:ident| $body:expr) => {{
        let $table = sqlite_schema::ensure_table($adapter, &mut *$conn, $collection).await?;
        let first = $body;
        match first {
            Err(e) if sqlite_schema::is_missing_table(&e) => {
                let $table = sqlite_schema::recreate_table($adapter, &mut *$conn, $collection).await?;
                $body?
            }
            other => other?,
        }
    }};
}

impl SqliteAdapter {
    /// 读取并过滤文档，按 `_id` 插入顺序返回
    async fn select_matching(
        &self,
        conn: &mut sqlx::SqliteConnection,
        collection: &str,
        query: &Document,
        offset: u64,
        limit: Option<u64>,
    ) -> SchemaResult<Vec<Document>> {
        let lookup = sqlite_query::id_lookup(query);
        let rows: Vec<(i64, String)> = with_table!(self, conn, collection, |table| match lookup {
            Some(id) => {
                let sql = format!("SELECT _id, data FROM {} WHERE _id = ?", table);
                sqlx::query_as(&sql).bind(id).fetch_all(&mut *conn).await
            }
            None => {
                let sql = format!("SELECT _id, data FROM {} ORDER BY _id", table);
                sqlx::query_as(&sql).fetch_all(&mut *conn).await
            }
        });
        debug!("SQLite读取 {} 行，开始内存匹配", rows.len());

        // limit 为 0 表示不限制
        let limit = limit.filter(|l| *l > 0);
        let mut skipped = 0u64;
        let mut results = Vec::new();
        for (id, data) in rows {
            let document = decode_document(id, &data)?;
            if !sqlite_query::matches(&document, query)? {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            results.push(document);
            if limit.is_some_and(|limit| results.len() as u64 >= limit) {
                break;
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::Embedded
    }

    fn identifier_codec(&self) -> &dyn IdentifierCodec {
        &self.codec
    }

    fn supports_native_ordering(&self) -> bool {
        false
    }

    async fn acquire(&self) -> SchemaResult<DatabaseConnection> {
        let conn = self.pool.acquire().await?;
        Ok(DatabaseConnection::SQLite(conn))
    }

    async fn close(&self) {
        info!("关闭SQLite连接池");
        self.pool.close().await;
    }

    async fn find(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
        options: &FindOptions,
    ) -> SchemaResult<Vec<Document>> {
        let conn = self.sqlite_connection(connection)?;
        self.select_matching(conn, collection, query, options.offset, options.limit)
            .await
    }

    async fn delete(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
    ) -> SchemaResult<bool> {
        let conn = self.sqlite_connection(connection)?;
        let matched = self
            .select_matching(&mut *conn, collection, query, 0, Some(1))
            .await?;
        let Some(DataValue::Int(id)) = matched.first().and_then(|doc| doc.get(ID_FIELD)) else {
            return Ok(false);
        };

        let table = self.table_identifier(collection)?;
        let sql = format!("DELETE FROM {} WHERE _id = ?", table);
        let result = sqlx::query(&sql).bind(*id).execute(&mut *conn).await?;
        debug!("SQLite删除 _id={}，影响行数 {}", id, result.rows_affected());
        Ok(result.rows_affected() == 1)
    }

    async fn update(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        document: &Document,
    ) -> SchemaResult<Option<Document>> {
        let id = match document.get(ID_FIELD) {
            Some(DataValue::Int(id)) => *id,
            other => {
                let shown = other.map(|v| v.to_string()).unwrap_or_default();
                return Err(crate::schema_error!(invalid_id, shown, BACKEND_NAME));
            }
        };

        let conn = self.sqlite_connection(connection)?;
        let data = encode_document(document)?;

        let result = with_table!(self, conn, collection, |table| {
            let sql = format!("UPDATE {} SET data = ? WHERE _id = ?", table);
            sqlx::query(&sql)
                .bind(data.as_str())
                .bind(id)
                .execute(&mut *conn)
                .await
        });

        if result.rows_affected() == 1 {
            Ok(Some(document.clone()))
        } else {
            debug!("SQLite更新未匹配 _id={}", id);
            Ok(None)
        }
    }

    async fn insert(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        document: &Document,
    ) -> SchemaResult<Option<Document>> {
        let explicit_id = match document.get(ID_FIELD) {
            Some(DataValue::Int(id)) => Some(*id),
            None | Some(DataValue::Null) => None,
            Some(other) => {
                return Err(crate::schema_error!(invalid_id, other, BACKEND_NAME));
            }
        };

        let conn = self.sqlite_connection(connection)?;
        let data = encode_document(document)?;

        let result = with_table!(self, conn, collection, |table| match explicit_id {
            Some(id) => {
                let sql = format!("INSERT INTO {} (_id, data) VALUES (?, ?)", table);
                sqlx::query(&sql)
                    .bind(id)
                    .bind(data.as_str())
                    .execute(&mut *conn)
                    .await
            }
            None => {
                let sql = format!("INSERT INTO {} (data) VALUES (?)", table);
                sqlx::query(&sql).bind(data.as_str()).execute(&mut *conn).await
            }
        });

        let id = result.last_insert_rowid();
        debug!("SQLite插入文档，_id={}", id);

        let mut stored = document.clone();
        stored.insert(ID_FIELD.to_string(), DataValue::Int(id));
        Ok(Some(stored))
    }

    async fn distinct(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        field: &str,
    ) -> SchemaResult<Vec<DataValue>> {
        let conn = self.sqlite_connection(connection)?;
        let documents = self
            .select_matching(conn, collection, &Document::new(), 0, None)
            .await?;

        let mut values: Vec<DataValue> = Vec::new();
        let mut push_unique = |value: &DataValue| {
            if !values.iter().any(|seen| seen.loose_eq(value)) {
                values.push(value.clone());
            }
        };
        for document in &documents {
            match document_path(document, field) {
                Some(DataValue::Array(items)) => items.iter().for_each(&mut push_unique),
                Some(value) => push_unique(value),
                None => {}
            }
        }
        Ok(values)
    }

    async fn count(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
    ) -> SchemaResult<u64> {
        let conn = self.sqlite_connection(connection)?;

        if query.is_empty() {
            let (count,): (i64,) = with_table!(self, conn, collection, |table| {
                let sql = format!("SELECT COUNT(*) FROM {}", table);
                sqlx::query_as(&sql).fetch_one(&mut *conn).await
            });
            return Ok(count.max(0) as u64);
        }

        let documents = self.select_matching(conn, collection, query, 0, None).await?;
        Ok(documents.len() as u64)
    }

    async fn create_index(
        &self,
        _connection: &mut DatabaseConnection,
        _collection: &str,
        _fields: &[IndexField],
        _options: &IndexOptions,
    ) -> SchemaResult<String> {
        Err(crate::schema_error!(unsupported, "create_index", BACKEND_NAME))
    }

    async fn drop_index(
        &self,
        _connection: &mut DatabaseConnection,
        _collection: &str,
        _name: &str,
    ) -> SchemaResult<()> {
        Err(crate::schema_error!(unsupported, "drop_index", BACKEND_NAME))
    }

    async fn drop_collection(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
    ) -> SchemaResult<bool> {
        let conn = self.sqlite_connection(connection)?;
        let existed = sqlite_schema::drop_table(self, conn, collection).await?;
        info!("删除SQLite集合 {}: {}", collection, existed);
        Ok(existed)
    }
}
