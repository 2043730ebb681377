//! MongoDB适配器模块
//!
//! - adapter.rs: 核心适配器结构与客户端创建
//! - operations.rs: DatabaseAdapter trait实现
//! - utils.rs: BSON数据转换工具函数
//! - query.rs: 查找选项构建
//! - schema.rs: 集合和索引管理

mod adapter;
mod operations;
mod query;
mod schema;
mod utils;

pub use adapter::MongoAdapter;
