//! 记录结构与字段校验模块
//!
//! 字段种类决定校验器链，记录结构按声明顺序持有字段定义，
//! 记录实例负责校验、后处理与持久化

pub mod convenience;
pub mod field_types;
pub mod macros;
pub mod record;
pub mod schema;
pub mod validators;

pub use convenience::*;
pub use field_types::{Constraints, FieldBuilder, FieldDefinition, FieldKind, PostProcessor};
pub use record::{Record, RecordState};
pub use schema::{Schema, SchemaBuilder};
pub use validators::Validator;
