//! # 配置构建器模块
//!
//! 提供数据库配置与连接池配置的构建器实现，支持链式调用和严格验证

pub mod database_builder;
pub mod pool_builder;

pub use database_builder::DatabaseConfigBuilder;
pub use pool_builder::PoolConfigBuilder;
