//! 数据库处理器模块
//!
//! 负责连接的建立与关闭、会话作用域内的连接独占，以及在集合句柄上
//! 完成标识符规范化和内存排序

mod collection;
mod handler;
mod session;

pub use collection::CollectionHandle;
pub use handler::DatabaseHandler;
pub use session::DatabaseSession;
