//! rat_schema - 声明式文档模式校验与跨存储后端映射库
//!
//! 一次声明记录结构，即可完成字段校验、后处理，并通过可互换的存储后端
//! 保存和查询。嵌入式存储（SQLite）与网络文档存储（MongoDB）的主键差异
//! 由标识符规范化器统一处理，调用方只接触规范标识符。
//!
//! ```ignore
//! use rat_schema::*;
//!
//! rat_schema::init();
//! let db = DatabaseHandler::connect(memory_config()).await?;
//! let users = Schema::builder("users")
//!     .field("name", string_field().build()?)
//!     .field("email", email_field().build()?)
//!     .database(db)
//!     .build()?;
//!
//! let mut user = users.create(document! { "name" => "John", "email" => "john@example.com" });
//! let id = user.save().await?;
//! let found = users.find_by_id(id).await?;
//! ```

// 导出所有公共模块
pub mod adapter;
pub mod config;
pub mod error;
pub mod i18n;
pub mod manager;
pub mod model;
pub mod normalizer;
pub mod security;
pub mod types;

// 重新导出常用类型和函数
pub use adapter::{create_adapter, DatabaseAdapter, DatabaseConnection};
pub use config::{
    embedded_config, memory_config, networked_config, DatabaseConfigBuilder, PoolConfigBuilder,
};
pub use error::{SchemaError, SchemaResult};
pub use manager::{CollectionHandle, DatabaseHandler, DatabaseSession};
pub use model::{
    any_field, choice_field, date_field, dict_field, email_field, list_field, number_field,
    password_field, string_field, FieldBuilder, FieldDefinition, FieldKind, Record, RecordState,
    Schema, SchemaBuilder, Validator,
};
pub use normalizer::{denormalize, normalize, EmbeddedIdCodec, IdentifierCodec, ObjectIdCodec};
pub use types::*;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_schema库
///
/// 注册多语言错误消息。日志系统由调用者自行初始化，本库不初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
    debug_log!("{} 初始化完成", get_info());
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_contains_name_and_version() {
        assert_eq!(get_info(), format!("rat_schema v{}", VERSION));
    }
}
