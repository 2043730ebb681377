//! 标识符安全验证工具
//!
//! 校验集合名与字段名，防止拼接进 SQL 或 Mongo 命令时产生注入

use crate::error::SchemaResult;
use crate::types::{BackendType, ID_FIELD};

/// 标识符安全验证器
pub struct SecurityValidator {
    backend: BackendType,
}

impl SecurityValidator {
    /// 创建新的安全验证器
    pub fn new(backend: BackendType) -> Self {
        Self { backend }
    }

    /// 验证集合名的安全性
    ///
    /// 嵌入式存储的集合名会成为 SQLite 表名，规则更严格
    ///
    /// # 参数
    /// * `collection` - 集合名
    pub fn validate_collection_name(&self, collection: &str) -> SchemaResult<()> {
        if collection.is_empty() {
            return Err(crate::schema_error!(config, "集合名不能为空"));
        }

        if collection.len() > 64 {
            return Err(crate::schema_error!(
                config,
                format!("集合名长度不能超过64个字符: {}", collection)
            ));
        }

        match self.backend {
            BackendType::Embedded => Self::validate_sql_table_name(collection),
            BackendType::Networked => Self::validate_nosql_collection_name(collection),
        }
    }

    /// 获取安全的表标识符（已加引号）
    pub fn get_safe_table_identifier(&self, collection: &str) -> SchemaResult<String> {
        self.validate_collection_name(collection)?;

        match self.backend {
            BackendType::Embedded => Ok(format!("\"{}\"", collection)),
            BackendType::Networked => Ok(collection.to_string()),
        }
    }

    /// 验证文档字段名
    ///
    /// 两种后端都以文档形式存储，规则一致；`_id` 为保留键
    pub fn validate_field_name(field_name: &str) -> SchemaResult<()> {
        if field_name.is_empty() {
            return Err(crate::schema_error!(config, "字段名不能为空"));
        }

        if field_name == ID_FIELD {
            return Err(crate::schema_error!(
                config,
                crate::i18n::tf("error.field_name_reserved", &[("name", field_name)])
            ));
        }

        // 不能以$开头（操作符前缀）
        if field_name.starts_with('$') {
            return Err(crate::schema_error!(
                config,
                format!("字段名不能以$开头: {}", field_name)
            ));
        }

        // 不能包含点号（嵌套字段路径分隔符）
        if field_name.contains('.') {
            return Err(crate::schema_error!(
                config,
                format!("字段名不能包含点号: {}", field_name)
            ));
        }

        if field_name.contains('\0') {
            return Err(crate::schema_error!(config, "字段名不能包含空字符"));
        }

        Ok(())
    }

    fn validate_sql_table_name(table_name: &str) -> SchemaResult<()> {
        // 检查第一个字符不能是数字
        if table_name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(crate::schema_error!(
                config,
                format!("表名不能以数字开头: {}", table_name)
            ));
        }

        for (i, ch) in table_name.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return Err(crate::schema_error!(
                    config,
                    format!("表名包含非法字符 '{}' 在位置 {}", ch, i)
                ));
            }
        }

        if table_name.to_ascii_lowercase().starts_with("sqlite_") {
            return Err(crate::schema_error!(
                config,
                format!("表名不能以sqlite_开头: {}", table_name)
            ));
        }

        Ok(())
    }

    fn validate_nosql_collection_name(collection_name: &str) -> SchemaResult<()> {
        if collection_name.starts_with('$') || collection_name.contains('$') {
            return Err(crate::schema_error!(
                config,
                format!("集合名不能包含$: {}", collection_name)
            ));
        }

        if collection_name.contains('\0') {
            return Err(crate::schema_error!(config, "集合名不能包含空字符"));
        }

        if collection_name.starts_with("system.") {
            return Err(crate::schema_error!(
                config,
                format!("集合名不能以system.开头: {}", collection_name)
            ));
        }

        Ok(())
    }
}

/// 按后端验证集合名
pub fn validate_collection_name(backend: BackendType, collection: &str) -> SchemaResult<()> {
    SecurityValidator::new(backend).validate_collection_name(collection)
}
