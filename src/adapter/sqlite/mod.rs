//! SQLite文档存储适配器
//!
//! 文档以 JSON 文本保存，查询在内存中匹配

mod adapter;
mod data_conversion;
mod operations;
mod query;
mod schema;

pub use adapter::SqliteAdapter;
