//! MongoDB适配器核心模块
//!
//! 提供MongoDB适配器的核心结构定义和客户端创建

use crate::adapter::{connection_mismatch, DatabaseConnection};
use crate::error::{SchemaError, SchemaResult};
use crate::normalizer::ObjectIdCodec;
use crate::security::SecurityValidator;
use crate::types::*;
use mongodb::bson::{doc, Document as BsonDocument};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use rat_logger::{debug, info};
use std::time::Duration;

/// MongoDB适配器
pub struct MongoAdapter {
    pub(crate) client: Client,
    pub(crate) database: Database,
    pub(crate) codec: ObjectIdCodec,
    pub(crate) security: SecurityValidator,
}

impl MongoAdapter {
    /// 按配置创建客户端并验证连通性
    pub async fn connect(config: &DatabaseConfig) -> SchemaResult<Self> {
        let (uri, name) = match (&config.connection, config.connection.mongodb_uri()) {
            (ConnectionConfig::Networked { name, .. }, Some(uri)) => (uri, name.clone()),
            _ => return Err(connection_mismatch(BackendType::Networked)),
        };

        let connection_error = |e: mongodb::error::Error| SchemaError::ConnectionError {
            message: crate::i18n::tf("error.mongodb_connection", &[("message", &e.to_string())]),
        };

        let mut options = ClientOptions::parse(&uri).await.map_err(connection_error)?;
        let pool = &config.pool;
        options.max_pool_size = Some(pool.max_connections);
        options.min_pool_size = Some(pool.min_connections);
        options.connect_timeout = Some(Duration::from_secs(pool.connection_timeout));
        options.server_selection_timeout = Some(Duration::from_secs(pool.connection_timeout));
        options.max_idle_time = Some(Duration::from_secs(pool.idle_timeout));

        let client = Client::with_options(options).map_err(connection_error)?;
        let database = client.database(&name);

        debug!("验证MongoDB连通性: {}", name);
        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(connection_error)?;
        info!("MongoDB连接成功: 数据库={}", name);

        Ok(Self {
            client,
            database,
            codec: ObjectIdCodec,
            security: SecurityValidator::new(BackendType::Networked),
        })
    }

    /// 取出会话中的数据库句柄
    pub(crate) fn mongo_database<'a>(
        &self,
        connection: &'a mut DatabaseConnection,
    ) -> SchemaResult<&'a Database> {
        match connection {
            DatabaseConnection::MongoDB(db) => Ok(db),
            #[allow(unreachable_patterns)]
            _ => Err(connection_mismatch(BackendType::Networked)),
        }
    }

    /// 获取经过名称校验的集合
    pub(crate) fn get_collection(
        &self,
        database: &Database,
        collection: &str,
    ) -> SchemaResult<Collection<BsonDocument>> {
        self.security.validate_collection_name(collection)?;
        Ok(database.collection::<BsonDocument>(collection))
    }
}
