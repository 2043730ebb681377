//! # 数据库配置构建器模块
//!
//! 提供数据库配置的构建器实现，支持链式调用和严格验证

use crate::error::SchemaResult;
use crate::types::*;
use rat_logger::info;

/// 数据库配置构建器
///
/// 连接配置必须显式设置；连接池未设置时使用 `PoolConfig::default()`
#[derive(Debug, Default)]
pub struct DatabaseConfigBuilder {
    backend: Option<BackendType>,
    connection: Option<ConnectionConfig>,
    pool: Option<PoolConfig>,
}

impl DatabaseConfig {
    /// 创建数据库配置构建器
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::new()
    }
}

impl DatabaseConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明期望的后端类型，`build()` 时与连接配置比对
    pub fn backend(mut self, backend: BackendType) -> Self {
        self.backend = Some(backend);
        self
    }

    /// 设置连接配置
    ///
    /// # 参数
    ///
    /// * `connection` - 连接配置
    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = Some(connection);
        self
    }

    /// 设置连接池配置
    ///
    /// # 参数
    ///
    /// * `pool` - 连接池配置
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }

    /// 构建数据库配置
    ///
    /// # 错误
    ///
    /// 连接配置未设置、与声明的后端类型不匹配或取值非法时返回错误
    pub fn build(self) -> SchemaResult<DatabaseConfig> {
        let connection = self
            .connection
            .ok_or_else(|| crate::schema_error!(config, "连接配置必须设置"))?;

        Self::validate_config(self.backend, &connection)?;

        let pool = self.pool.unwrap_or_default();

        info!("创建数据库配置: 后端={}", connection.backend_type());

        Ok(DatabaseConfig { connection, pool })
    }

    /// 验证配置的一致性
    fn validate_config(
        backend: Option<BackendType>,
        connection: &ConnectionConfig,
    ) -> SchemaResult<()> {
        if let Some(backend) = backend {
            if backend != connection.backend_type() {
                return Err(crate::schema_error!(
                    config,
                    format!("后端类型 {} 与连接配置不匹配", backend)
                ));
            }
        }

        match connection {
            ConnectionConfig::Embedded { path } if path.is_empty() => {
                Err(crate::schema_error!(config, "嵌入式存储路径不能为空"))
            }
            ConnectionConfig::Networked { host, .. } if host.is_empty() => {
                Err(crate::schema_error!(config, "主机地址不能为空"))
            }
            ConnectionConfig::Networked { name, .. } if name.is_empty() => {
                Err(crate::schema_error!(config, "数据库名不能为空"))
            }
            ConnectionConfig::Networked { port: 0, .. } => {
                Err(crate::schema_error!(config, "端口号不能为零"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_is_required() {
        assert!(DatabaseConfig::builder().build().is_err());
    }

    #[test]
    fn backend_must_match_connection() {
        let result = DatabaseConfig::builder()
            .backend(BackendType::Networked)
            .connection(ConnectionConfig::embedded_default())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn pool_defaults_when_unset() {
        let config = DatabaseConfig::builder()
            .backend(BackendType::Embedded)
            .connection(ConnectionConfig::Embedded { path: "data.db".into() })
            .build()
            .unwrap();
        assert_eq!(config.pool, PoolConfig::default());
    }
}
