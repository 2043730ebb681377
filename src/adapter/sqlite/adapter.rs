//! SQLite适配器核心模块
//!
//! 提供SQLite适配器的核心结构定义、连接池创建和表创建锁

use crate::adapter::{connection_mismatch, DatabaseConnection};
use crate::error::{SchemaError, SchemaResult};
use crate::normalizer::EmbeddedIdCodec;
use crate::security::SecurityValidator;
use crate::types::*;
use rat_logger::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

const MEMORY_PATH: &str = ":memory:";

/// SQLite适配器
///
/// 每个集合对应一张 `(_id INTEGER PRIMARY KEY AUTOINCREMENT, data TEXT)` 表
pub struct SqliteAdapter {
    pub(crate) pool: SqlitePool,
    pub(crate) codec: EmbeddedIdCodec,
    pub(crate) security: SecurityValidator,
    /// 已确认存在的表，防止重复建表
    pub(crate) created_tables: Mutex<HashSet<String>>,
}

impl SqliteAdapter {
    /// 按配置建立连接池
    ///
    /// 内存库只使用一个常驻连接，保证数据在会话之间保留
    pub async fn connect(config: &DatabaseConfig) -> SchemaResult<Self> {
        let ConnectionConfig::Embedded { path } = &config.connection else {
            return Err(connection_mismatch(BackendType::Embedded));
        };
        let pool_config = &config.pool;

        let pool = if path == MEMORY_PATH {
            info!("连接SQLite内存数据库");
            let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
                SchemaError::ConnectionError {
                    message: crate::i18n::tf("error.sqlite_memory", &[("message", &e.to_string())]),
                }
            })?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(pool_config.connection_timeout))
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .map_err(|e| SchemaError::ConnectionError {
                    message: crate::i18n::tf("error.sqlite_memory", &[("message", &e.to_string())]),
                })?
        } else {
            info!("连接SQLite数据库文件: {}", path);
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        SchemaError::ConnectionError {
                            message: crate::i18n::tf(
                                "error.sqlite_dir_create",
                                &[("message", &e.to_string())],
                            ),
                        }
                    })?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(pool_config.max_connections.max(1))
                .min_connections(pool_config.min_connections)
                .acquire_timeout(Duration::from_secs(pool_config.connection_timeout))
                .idle_timeout(Some(Duration::from_secs(pool_config.idle_timeout)))
                .max_lifetime(Some(Duration::from_secs(pool_config.max_lifetime)))
                .connect_with(options)
                .await
                .map_err(|e| SchemaError::ConnectionError {
                    message: crate::i18n::tf(
                        "error.sqlite_connection",
                        &[("message", &e.to_string())],
                    ),
                })?
        };

        Ok(Self {
            pool,
            codec: EmbeddedIdCodec,
            security: SecurityValidator::new(BackendType::Embedded),
            created_tables: Mutex::new(HashSet::new()),
        })
    }

    /// 取出会话中的SQLite连接
    pub(crate) fn sqlite_connection<'a>(
        &self,
        connection: &'a mut DatabaseConnection,
    ) -> SchemaResult<&'a mut sqlx::SqliteConnection> {
        match connection {
            DatabaseConnection::SQLite(conn) => Ok(&mut **conn),
            #[allow(unreachable_patterns)]
            _ => Err(connection_mismatch(BackendType::Embedded)),
        }
    }

    /// 经过校验并加引号的表名
    pub(crate) fn table_identifier(&self, collection: &str) -> SchemaResult<String> {
        let identifier = self.security.get_safe_table_identifier(collection)?;
        debug!("SQLite表标识符: {}", identifier);
        Ok(identifier)
    }
}
