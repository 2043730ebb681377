//! 数据类型定义
//!
//! 定义后端类型、连接配置、通用数据值、标识符和查询选项

pub mod database_config;
pub mod data_value;
pub mod query;
pub mod id_types;

pub use database_config::{BackendType, ConnectionConfig, DatabaseConfig, PoolConfig};
pub use data_value::{document_path, json_value_to_data_value, DataValue, Document, ValueKind};
pub use query::{FindOptions, IndexField, IndexOptions, LogicalOperator, QueryOperator, SortDirection};
pub use id_types::{IdType, ObjectId, SchemaId};

/// 保留的标识符键
pub const ID_FIELD: &str = "_id";
