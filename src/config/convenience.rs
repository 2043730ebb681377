//! # 便利配置函数模块
//!
//! 常用后端配置的快捷构造

use crate::config::builders::DatabaseConfigBuilder;
use crate::error::SchemaResult;
use crate::types::*;

/// 创建嵌入式存储配置
///
/// # 参数
///
/// * `path` - 数据库文件路径，`:memory:` 表示内存库
pub fn embedded_config<P: Into<String>>(path: P) -> SchemaResult<DatabaseConfig> {
    DatabaseConfigBuilder::new()
        .backend(BackendType::Embedded)
        .connection(ConnectionConfig::Embedded { path: path.into() })
        .build()
}

/// 创建内存嵌入式存储配置
pub fn memory_config() -> DatabaseConfig {
    DatabaseConfig::default()
}

/// 创建网络文档存储配置
///
/// # 参数
///
/// * `host` - 主机地址
/// * `port` - 端口号
/// * `name` - 数据库名
/// * `credentials` - 可选的 (用户名, 密码)
pub fn networked_config<H: Into<String>, N: Into<String>>(
    host: H,
    port: u16,
    name: N,
    credentials: Option<(String, String)>,
) -> SchemaResult<DatabaseConfig> {
    let (username, password) = match credentials {
        Some((username, password)) => (Some(username), Some(password)),
        None => (None, None),
    };

    DatabaseConfigBuilder::new()
        .backend(BackendType::Networked)
        .connection(ConnectionConfig::Networked {
            host: host.into(),
            port,
            name: name.into(),
            username,
            password,
            auth_source: None,
        })
        .build()
}
