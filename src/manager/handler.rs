//! 数据库处理器核心定义

use crate::adapter::{create_adapter, DatabaseAdapter};
use crate::error::SchemaResult;
use crate::manager::DatabaseSession;
use crate::types::{BackendType, DatabaseConfig};
use rat_logger::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 数据库处理器 - 持有一个后端适配器及其连接池
///
/// 由调用者显式创建并传给 `Schema`，不存在全局实例
pub struct DatabaseHandler {
    config: DatabaseConfig,
    adapter: Arc<dyn DatabaseAdapter>,
    closed: AtomicBool,
}

impl std::fmt::Debug for DatabaseHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHandler")
            .field("backend", &self.config.backend_type())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl DatabaseHandler {
    /// 按配置连接后端
    pub async fn connect(config: DatabaseConfig) -> SchemaResult<Arc<Self>> {
        info!("连接存储后端: {}", config.backend_type());
        let adapter = create_adapter(&config).await?;
        Ok(Arc::new(Self {
            config,
            adapter,
            closed: AtomicBool::new(false),
        }))
    }

    /// 开启一个会话，会话持有独占连接直到被释放
    pub async fn session(self: &Arc<Self>) -> SchemaResult<DatabaseSession> {
        if self.is_closed() {
            return Err(crate::schema_error!(state, "数据库处理器已关闭"));
        }
        let connection = self.adapter.acquire().await?;
        debug!("开启数据库会话: {}", self.backend_type());
        Ok(DatabaseSession::new(Arc::clone(self), connection))
    }

    /// 关闭连接池；重复调用无副作用
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("数据库处理器已经关闭");
            return;
        }
        self.adapter.close().await;
        info!("数据库处理器已关闭: {}", self.backend_type());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn backend_type(&self) -> BackendType {
        self.adapter.backend_type()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub(crate) fn adapter(&self) -> &dyn DatabaseAdapter {
        self.adapter.as_ref()
    }
}

#[cfg(all(test, feature = "sqlite-support"))]
mod tests {
    use super::*;
    use crate::config::memory_config;
    use crate::error::SchemaError;

    #[tokio::test]
    async fn closed_handler_refuses_sessions() {
        let handler = DatabaseHandler::connect(memory_config()).await.unwrap();
        assert_eq!(handler.backend_type(), BackendType::Embedded);

        handler.close().await;
        handler.close().await;
        assert!(handler.is_closed());

        let err = handler.session().await.unwrap_err();
        assert!(matches!(err, SchemaError::InvalidState { .. }));
    }
}
