//! 数据库适配器模块
//!
//! 提供统一的存储后端操作接口，屏蔽不同后端的实现差异。
//! 适配器只处理原生主键，规范标识符的改写由 `normalizer` 在上层完成。

use crate::error::{SchemaError, SchemaResult};
use crate::normalizer::IdentifierCodec;
use crate::types::*;
use async_trait::async_trait;
use rat_logger::info;
use std::sync::Arc;

// 导入各个存储后端适配器 (条件编译)
#[cfg(feature = "mongodb-support")]
mod mongodb;
#[cfg(feature = "sqlite-support")]
mod sqlite;

#[cfg(feature = "mongodb-support")]
pub use mongodb::MongoAdapter;
#[cfg(feature = "sqlite-support")]
pub use sqlite::SqliteAdapter;

/// 会话独占的后端连接
///
/// 会话结束时随之释放，池化连接自动归还连接池
pub enum DatabaseConnection {
    #[cfg(feature = "sqlite-support")]
    SQLite(sqlx::pool::PoolConnection<sqlx::Sqlite>),
    #[cfg(feature = "mongodb-support")]
    MongoDB(::mongodb::Database),
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "sqlite-support")]
            DatabaseConnection::SQLite(_) => write!(f, "DatabaseConnection::SQLite"),
            #[cfg(feature = "mongodb-support")]
            DatabaseConnection::MongoDB(db) => write!(f, "DatabaseConnection::MongoDB({})", db.name()),
            #[allow(unreachable_patterns)]
            _ => write!(f, "DatabaseConnection"),
        }
    }
}

/// 存储后端适配器trait，定义统一的文档操作接口
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// 后端类型
    fn backend_type(&self) -> BackendType;

    /// 该后端主键的编解码器
    fn identifier_codec(&self) -> &dyn IdentifierCodec;

    /// 后端能否原生执行排序与分页
    fn supports_native_ordering(&self) -> bool;

    /// 获取一个会话独占的连接
    async fn acquire(&self) -> SchemaResult<DatabaseConnection>;

    /// 关闭底层连接池
    async fn close(&self);

    /// 查询文档
    async fn find(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
        options: &FindOptions,
    ) -> SchemaResult<Vec<Document>>;

    /// 删除恰好一条匹配的文档
    async fn delete(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
    ) -> SchemaResult<bool>;

    /// 按 `_id` 整体替换文档，未匹配时返回 `None`
    async fn update(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        document: &Document,
    ) -> SchemaResult<Option<Document>>;

    /// 插入文档，返回带 `_id` 的文档
    async fn insert(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        document: &Document,
    ) -> SchemaResult<Option<Document>>;

    /// 字段的去重取值
    async fn distinct(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        field: &str,
    ) -> SchemaResult<Vec<DataValue>>;

    /// 统计匹配文档数
    async fn count(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        query: &Document,
    ) -> SchemaResult<u64>;

    /// 创建索引，返回索引名
    async fn create_index(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        fields: &[IndexField],
        options: &IndexOptions,
    ) -> SchemaResult<String>;

    /// 删除索引
    async fn drop_index(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
        name: &str,
    ) -> SchemaResult<()>;

    /// 删除整个集合
    async fn drop_collection(
        &self,
        connection: &mut DatabaseConnection,
        collection: &str,
    ) -> SchemaResult<bool>;
}

/// 根据配置创建适配器
///
/// 对应后端未编译进来时返回 `UnsupportedDatabase`
pub async fn create_adapter(config: &DatabaseConfig) -> SchemaResult<Arc<dyn DatabaseAdapter>> {
    let backend = config.backend_type();
    info!("创建存储后端适配器: {}", backend);

    match backend {
        BackendType::Embedded => {
            #[cfg(feature = "sqlite-support")]
            {
                let adapter = SqliteAdapter::connect(config).await?;
                Ok(Arc::new(adapter))
            }
            #[cfg(not(feature = "sqlite-support"))]
            {
                Err(backend_disabled(backend, "sqlite-support"))
            }
        }
        BackendType::Networked => {
            #[cfg(feature = "mongodb-support")]
            {
                let adapter = MongoAdapter::connect(config).await?;
                Ok(Arc::new(adapter))
            }
            #[cfg(not(feature = "mongodb-support"))]
            {
                Err(backend_disabled(backend, "mongodb-support"))
            }
        }
    }
}

#[cfg(not(all(feature = "sqlite-support", feature = "mongodb-support")))]
fn backend_disabled(backend: BackendType, feature: &str) -> SchemaError {
    SchemaError::UnsupportedDatabase {
        db_type: crate::i18n::tf(
            "error.backend_disabled",
            &[("backend", backend.as_str()), ("feature", feature)],
        ),
    }
}

/// 连接类型与适配器不匹配
#[cfg(any(feature = "sqlite-support", feature = "mongodb-support"))]
pub(crate) fn connection_mismatch(expected: BackendType) -> SchemaError {
    SchemaError::ConnectionError {
        message: format!("连接类型与 {} 适配器不匹配", expected),
    }
}
