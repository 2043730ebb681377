//! 字段便捷函数模块
//!
//! 返回预设种类的 `FieldBuilder`，可继续链式设置约束后 `build()`

use crate::model::field_types::{FieldBuilder, FieldKind};
use crate::types::DataValue;

/// 便捷函数：任意值字段（只检查必填）
pub fn any_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Any)
}

/// 便捷函数：字符串字段
pub fn string_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::String)
}

/// 便捷函数：数值字段
pub fn number_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Number)
}

/// 便捷函数：日期字段（数值时间戳或日期时间）
pub fn date_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Date)
}

/// 便捷函数：邮箱字段
pub fn email_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Email)
}

/// 便捷函数：密码字段
///
/// 哈希函数作为最后一个后处理执行，最小长度不低于 5
pub fn password_field<F>(password_func: F) -> FieldBuilder
where
    F: Fn(DataValue) -> DataValue + Send + Sync + 'static,
{
    FieldBuilder::new(FieldKind::Password).password_func(password_func)
}

/// 便捷函数：选项字段
pub fn choice_field<I, V>(choices: I) -> FieldBuilder
where
    I: IntoIterator<Item = V>,
    V: Into<DataValue>,
{
    FieldBuilder::new(FieldKind::Choice).choices(choices)
}

/// 便捷函数：映射字段
pub fn dict_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Dict)
}

/// 便捷函数：列表字段
pub fn list_field() -> FieldBuilder {
    FieldBuilder::new(FieldKind::List)
}
