//! # 配置管理模块
//!
//! 数据库配置的构建器、文件加载与便利函数。
//! 配置值显式传入 `DatabaseHandler::connect`，不存在全局配置单例

pub mod builders;
pub mod convenience;
pub mod core;

pub use builders::{DatabaseConfigBuilder, PoolConfigBuilder};
pub use convenience::{embedded_config, memory_config, networked_config};
