//! 数据库会话
//!
//! 会话在作用域内独占一个连接，离开作用域（包括 `?` 提前返回）时连接归还

use crate::adapter::DatabaseConnection;
use crate::error::SchemaResult;
use crate::manager::{CollectionHandle, DatabaseHandler};
use crate::security::SecurityValidator;
use rat_logger::info;
use std::sync::Arc;

/// 作用域内的数据库会话
pub struct DatabaseSession {
    handler: Arc<DatabaseHandler>,
    connection: DatabaseConnection,
}

impl std::fmt::Debug for DatabaseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSession")
            .field("connection", &self.connection)
            .finish()
    }
}

impl DatabaseSession {
    pub(crate) fn new(handler: Arc<DatabaseHandler>, connection: DatabaseConnection) -> Self {
        Self {
            handler,
            connection,
        }
    }

    /// 获取集合句柄，集合名按后端规则校验
    pub fn collection(&mut self, name: &str) -> SchemaResult<CollectionHandle<'_>> {
        SecurityValidator::new(self.handler.backend_type()).validate_collection_name(name)?;
        Ok(CollectionHandle::new(self, name.to_string()))
    }

    /// 删除集合，返回删除前集合是否存在
    pub async fn drop_collection(&mut self, name: &str) -> SchemaResult<bool> {
        SecurityValidator::new(self.handler.backend_type()).validate_collection_name(name)?;
        let adapter = self.handler.adapter();
        let existed = adapter.drop_collection(&mut self.connection, name).await?;
        info!("删除集合 {}: 删除前存在={}", name, existed);
        Ok(existed)
    }

    pub fn handler(&self) -> &Arc<DatabaseHandler> {
        &self.handler
    }

    /// 同时借出处理器与连接，供集合句柄调用适配器
    pub(crate) fn parts(&mut self) -> (&DatabaseHandler, &mut DatabaseConnection) {
        (&self.handler, &mut self.connection)
    }
}

impl Drop for DatabaseSession {
    fn drop(&mut self) {
        crate::debug_log!("释放数据库会话连接");
    }
}
