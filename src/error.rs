//! 错误类型定义
//!
//! 统一的错误枚举，覆盖字段校验、配置、后端能力和连接等错误场景

use thiserror::Error;

/// rat_schema 统一错误类型
#[derive(Error, Debug)]
pub enum SchemaError {
    /// 字段值未通过字段类型的校验链
    #[error("字段 \"{field}\" 的值 \"{value}\" 校验失败")]
    ValidationError { field: String, value: String },

    /// 声明期配置错误（缺少必要选项、非法正则等）
    #[error("配置错误: {message}")]
    ConfigError { message: String },

    /// 后端不支持的操作
    #[error("后端 {backend} 不支持操作: {operation}")]
    UnsupportedOperation { operation: String, backend: String },

    /// 后端未编译或未知
    #[error("不支持的数据库类型: {db_type}")]
    UnsupportedDatabase { db_type: String },

    /// 标识符无法转换为后端原生类型
    #[error("无效的标识符 \"{value}\" (后端: {backend})")]
    InvalidIdentifier { value: String, backend: String },

    /// 记录状态不允许该操作
    #[error("记录状态错误: {message}")]
    InvalidState { message: String },

    /// 数据库连接错误
    #[error("数据库连接失败: {message}")]
    ConnectionError { message: String },

    /// 查询执行错误
    #[error("查询执行失败: {message}")]
    QueryError { message: String },

    /// 序列化错误
    #[error("数据序列化失败: {message}")]
    SerializationError { message: String },

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// rat_schema 结果类型
pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    /// 是否为字段校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, SchemaError::ValidationError { .. })
    }

    /// 校验失败的字段名
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::SerializationError {
            message: e.to_string(),
        }
    }
}

#[cfg(feature = "sqlite-support")]
impl From<sqlx::Error> for SchemaError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                SchemaError::ConnectionError {
                    message: e.to_string(),
                }
            }
            other => SchemaError::QueryError {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(feature = "mongodb-support")]
impl From<mongodb::error::Error> for SchemaError {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match *e.kind {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. } => SchemaError::ConnectionError {
                message: e.to_string(),
            },
            _ => SchemaError::QueryError {
                message: e.to_string(),
            },
        }
    }
}

/// 便捷宏：构造常用错误
#[macro_export]
macro_rules! schema_error {
    (validation, $field:expr, $value:expr) => {
        $crate::error::SchemaError::ValidationError {
            field: $field.to_string(),
            value: $value.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::SchemaError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (unsupported, $operation:expr, $backend:expr) => {
        $crate::error::SchemaError::UnsupportedOperation {
            operation: $operation.to_string(),
            backend: $backend.to_string(),
        }
    };
    (unsupported_db, $db_type:expr) => {
        $crate::error::SchemaError::UnsupportedDatabase {
            db_type: $db_type.to_string(),
        }
    };
    (invalid_id, $value:expr, $backend:expr) => {
        $crate::error::SchemaError::InvalidIdentifier {
            value: $value.to_string(),
            backend: $backend.to_string(),
        }
    };
    (state, $msg:expr) => {
        $crate::error::SchemaError::InvalidState {
            message: $msg.to_string(),
        }
    };
    (connection, $msg:expr) => {
        $crate::error::SchemaError::ConnectionError {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::SchemaError::QueryError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::SchemaError::SerializationError {
            message: $msg.to_string(),
        }
    };
}
