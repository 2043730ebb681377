//! 字段类型定义模块
//!
//! 一个通用的 `FieldDefinition`，由种类标签决定校验器链与预设约束。
//! 邮箱、密码、选项等派生种类只是字符串种类加上预设约束。

use crate::error::SchemaResult;
use crate::model::validators::Validator;
use crate::types::{DataValue, ValueKind};
use once_cell::sync::Lazy;
use regex::Regex;
use rat_logger::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 邮箱地址的正则
pub const EMAIL_PATTERN: &str = r"(^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$)";

/// 密码字段的最小长度下限
pub const PASSWORD_MIN_LENGTH: i64 = 5;

static EMAIL_REGEX: Lazy<Option<Regex>> = Lazy::new(|| compile_anchored(EMAIL_PATTERN).ok());

/// 后处理函数：值进，值出
pub type PostProcessor = Arc<dyn Fn(DataValue) -> DataValue + Send + Sync>;

/// 字段种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// 仅检查必填
    Any,
    String,
    Number,
    /// 数值时间戳或日期时间
    Date,
    /// 字符串 + 邮箱正则
    Email,
    /// 字符串 + 最小长度 + 必需的哈希函数
    Password,
    /// 字符串 + 选项集合
    Choice,
    Dict,
    List,
}

impl FieldKind {
    /// 该种类的校验器链
    pub fn validators(&self) -> Vec<Validator> {
        use Validator::*;
        match self {
            FieldKind::Any => vec![Presence],
            FieldKind::Number => vec![Presence, Number, Min, Max, Range],
            FieldKind::Date => vec![Presence, Date, Min, Max, Range],
            FieldKind::String | FieldKind::Email | FieldKind::Password => {
                vec![Presence, String, StringMin, StringMax, Regexp]
            }
            FieldKind::Choice => vec![Presence, String, Regexp, Choice],
            FieldKind::Dict => vec![Presence, Dict],
            FieldKind::List => vec![Presence, List],
        }
    }

    fn accepts_bounds(&self) -> bool {
        matches!(
            self,
            FieldKind::Number
                | FieldKind::Date
                | FieldKind::String
                | FieldKind::Email
                | FieldKind::Password
        )
    }

    fn accepts_regexp(&self) -> bool {
        matches!(
            self,
            FieldKind::String | FieldKind::Password | FieldKind::Choice
        )
    }
}

/// 种类相关的约束
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// 数值下限或字符串长度下限
    pub min: Option<DataValue>,
    /// 数值上限或字符串长度上限
    pub max: Option<DataValue>,
    /// 允许的取值集合
    pub range: Option<Vec<DataValue>>,
    /// 已锚定到开头的正则
    pub regexp: Option<Regex>,
    pub choices: Option<Vec<DataValue>>,
    /// 映射的子字段定义（按声明顺序）
    pub allowed_fields: Option<Vec<(String, FieldDefinition)>>,
    pub allowed_values: Option<Vec<DataValue>>,
    /// 列表元素的字段定义
    pub allowed_type: Option<Box<FieldDefinition>>,
    /// 列表元素（记录）各键的值类别
    pub allowed_type_map: Option<Vec<(String, ValueKind)>>,
}

/// 字段定义
///
/// 声明后不可变，由 `Schema` 持有并在所有记录间共享
#[derive(Clone)]
pub struct FieldDefinition {
    kind: FieldKind,
    required: bool,
    default: DataValue,
    constraints: Constraints,
    post_processors: Vec<PostProcessor>,
    validators: Vec<Validator>,
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("constraints", &self.constraints)
            .field("post_processors", &self.post_processors.len())
            .finish()
    }
}

impl FieldDefinition {
    /// 创建字段构建器
    pub fn builder(kind: FieldKind) -> FieldBuilder {
        FieldBuilder::new(kind)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 默认值，未设置时为 `Null`
    pub fn default_value(&self) -> &DataValue {
        &self.default
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn has_post_processors(&self) -> bool {
        !self.post_processors.is_empty()
    }

    /// 依次执行校验器链，全部通过才有效
    pub fn validate(&self, value: &DataValue) -> bool {
        self.validators
            .iter()
            .all(|validator| validator.validate(value, self))
    }

    /// 校验并在失败时带上字段名返回错误
    pub fn validate_with_field_name(&self, value: &DataValue, field_name: &str) -> SchemaResult<()> {
        if self.validate(value) {
            Ok(())
        } else {
            debug!("字段校验失败: {} = {}", field_name, value);
            Err(crate::schema_error!(validation, field_name, value))
        }
    }

    /// 按声明顺序执行后处理；未配置时原样返回
    pub fn process(&self, value: DataValue) -> DataValue {
        self.post_processors
            .iter()
            .fold(value, |value, processor| processor(value))
    }
}

/// 字段构建器
///
/// 只接受与种类相关的选项，其余选项在 `build()` 时忽略并记录调试日志
#[derive(Clone)]
pub struct FieldBuilder {
    kind: FieldKind,
    required: bool,
    default: DataValue,
    min: Option<DataValue>,
    max: Option<DataValue>,
    range: Option<Vec<DataValue>>,
    regexp: Option<String>,
    choices: Option<Vec<DataValue>>,
    allowed_fields: Option<Vec<(String, FieldDefinition)>>,
    allowed_values: Option<Vec<DataValue>>,
    allowed_type: Option<FieldDefinition>,
    allowed_type_map: Option<Vec<(String, ValueKind)>>,
    post_processors: Vec<PostProcessor>,
    password_func: Option<PostProcessor>,
}

impl FieldBuilder {
    /// 创建新的构建器，字段默认必填
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            default: DataValue::Null,
            min: None,
            max: None,
            range: None,
            regexp: None,
            choices: None,
            allowed_fields: None,
            allowed_values: None,
            allowed_type: None,
            allowed_type_map: None,
            post_processors: Vec::new(),
            password_func: None,
        }
    }

    /// 设置是否必填
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 设置默认值
    pub fn default<V: Into<DataValue>>(mut self, value: V) -> Self {
        self.default = value.into();
        self
    }

    /// 设置下限（数值或字符串长度）
    pub fn min<V: Into<DataValue>>(mut self, min: V) -> Self {
        self.min = Some(min.into());
        self
    }

    /// 设置上限（数值或字符串长度）
    pub fn max<V: Into<DataValue>>(mut self, max: V) -> Self {
        self.max = Some(max.into());
        self
    }

    /// 设置允许的取值集合
    pub fn range<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DataValue>,
    {
        self.range = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// 设置正则，匹配从值的开头开始
    pub fn regexp(mut self, pattern: impl Into<String>) -> Self {
        self.regexp = Some(pattern.into());
        self
    }

    /// 设置选项集合
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DataValue>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// 添加映射的子字段定义
    pub fn allowed_field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.allowed_fields
            .get_or_insert_with(Vec::new)
            .push((name.into(), field));
        self
    }

    /// 设置列表元素的允许取值
    pub fn allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DataValue>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// 设置列表元素的字段定义
    pub fn allowed_type(mut self, field: FieldDefinition) -> Self {
        self.allowed_type = Some(field);
        self
    }

    /// 声明列表元素中某个键的值类别
    pub fn allowed_type_map(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.allowed_type_map
            .get_or_insert_with(Vec::new)
            .push((key.into(), kind));
        self
    }

    /// 追加后处理函数
    pub fn post_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(DataValue) -> DataValue + Send + Sync + 'static,
    {
        self.post_processors.push(Arc::new(processor));
        self
    }

    /// 设置密码哈希函数（密码字段必需）
    pub fn password_func<F>(mut self, func: F) -> Self
    where
        F: Fn(DataValue) -> DataValue + Send + Sync + 'static,
    {
        self.password_func = Some(Arc::new(func));
        self
    }

    /// 构建字段定义
    ///
    /// # 错误
    ///
    /// 密码字段缺少哈希函数或正则非法时返回 `ConfigError`
    pub fn build(self) -> SchemaResult<FieldDefinition> {
        let kind = self.kind;
        let mut ignored: Vec<&str> = Vec::new();
        let mut constraints = Constraints::default();
        let mut post_processors = self.post_processors;

        if kind.accepts_bounds() {
            constraints.min = self.min;
            constraints.max = self.max;
        } else {
            if self.min.is_some() {
                ignored.push("min");
            }
            if self.max.is_some() {
                ignored.push("max");
            }
        }

        match (kind, self.range) {
            (FieldKind::Number | FieldKind::Date, range) => constraints.range = range,
            (_, Some(_)) => ignored.push("range"),
            _ => {}
        }

        match (kind, self.regexp) {
            (FieldKind::Email, Some(_)) => ignored.push("regexp"),
            (k, Some(pattern)) if k.accepts_regexp() => {
                constraints.regexp = Some(compile_anchored(&pattern)?);
            }
            (_, Some(_)) => ignored.push("regexp"),
            _ => {}
        }

        match (kind, self.choices) {
            (FieldKind::Choice, choices) => constraints.choices = choices,
            (_, Some(_)) => ignored.push("choices"),
            _ => {}
        }

        match (kind, self.allowed_fields) {
            (FieldKind::Dict, fields) => constraints.allowed_fields = fields,
            (_, Some(_)) => ignored.push("allowed_fields"),
            _ => {}
        }

        if kind == FieldKind::List {
            constraints.allowed_values = self.allowed_values;
            constraints.allowed_type = self.allowed_type.map(Box::new);
            constraints.allowed_type_map = self.allowed_type_map;
        } else {
            if self.allowed_values.is_some() {
                ignored.push("allowed_values");
            }
            if self.allowed_type.is_some() {
                ignored.push("allowed_type");
            }
            if self.allowed_type_map.is_some() {
                ignored.push("allowed_type_map");
            }
        }

        match kind {
            FieldKind::Email => {
                let email = (*EMAIL_REGEX).clone().ok_or_else(|| {
                    crate::schema_error!(config, "内置邮箱正则编译失败")
                })?;
                constraints.regexp = Some(email);
            }
            FieldKind::Password => {
                let password_func = self.password_func.ok_or_else(|| {
                    crate::schema_error!(config, crate::i18n::t("error.password_func_missing"))
                })?;

                let min = constraints
                    .min
                    .as_ref()
                    .and_then(DataValue::as_f64)
                    .map_or(PASSWORD_MIN_LENGTH, |m| (m.ceil() as i64).min(PASSWORD_MIN_LENGTH));
                constraints.max = constraints
                    .max
                    .as_ref()
                    .and_then(DataValue::as_f64)
                    .map(|m| DataValue::Int((m.floor() as i64).max(min)));
                constraints.min = Some(DataValue::Int(min));

                // 哈希函数总是最后一个后处理，空值原样保留
                post_processors.push(Arc::new(move |value: DataValue| {
                    if value.is_null() {
                        value
                    } else {
                        password_func(value)
                    }
                }));
            }
            _ => {
                if self.password_func.is_some() {
                    ignored.push("password_func");
                }
            }
        }

        if !ignored.is_empty() {
            debug!("字段种类 {:?} 忽略无关选项: {:?}", kind, ignored);
        }

        Ok(FieldDefinition {
            kind,
            required: self.required,
            default: self.default,
            constraints,
            post_processors,
            validators: kind.validators(),
        })
    }
}

/// 编译从开头匹配的正则
fn compile_anchored(pattern: &str) -> SchemaResult<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
        crate::schema_error!(
            config,
            crate::i18n::tf(
                "error.invalid_regexp",
                &[("pattern", pattern), ("message", &e.to_string())]
            )
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    fn hash(value: DataValue) -> DataValue {
        match value {
            DataValue::String(s) => DataValue::String(format!("hashed:{}", s)),
            other => other,
        }
    }

    #[test]
    fn every_kind_follows_required_flag_on_null() {
        let kinds = [
            FieldKind::Any,
            FieldKind::String,
            FieldKind::Number,
            FieldKind::Date,
            FieldKind::Email,
            FieldKind::Choice,
            FieldKind::Dict,
            FieldKind::List,
        ];
        for kind in kinds {
            let required = FieldBuilder::new(kind).min(1).choices(["a"]).build().unwrap();
            let optional = FieldBuilder::new(kind)
                .required(false)
                .min(1)
                .choices(["a"])
                .build()
                .unwrap();
            assert!(!required.validate(&DataValue::Null), "{:?}", kind);
            assert!(optional.validate(&DataValue::Null), "{:?}", kind);
        }

        let password = FieldBuilder::new(FieldKind::Password)
            .required(false)
            .password_func(hash)
            .build()
            .unwrap();
        assert!(password.validate(&DataValue::Null));
    }

    #[test]
    fn string_exact_length_boundary() {
        let field = FieldBuilder::new(FieldKind::String).min(5).max(5).build().unwrap();
        assert!(field.validate(&DataValue::from("abcde")));
        assert!(!field.validate(&DataValue::from("abcd")));
        assert!(!field.validate(&DataValue::from("abcdef")));
    }

    #[test]
    fn string_length_counts_characters() {
        let field = FieldBuilder::new(FieldKind::String).max(2).build().unwrap();
        assert!(field.validate(&DataValue::from("日本")));
    }

    #[test]
    fn email_preset_regexp() {
        let field = FieldBuilder::new(FieldKind::Email).build().unwrap();
        assert!(field.validate(&DataValue::from("john.doe@example.com")));
        assert!(!field.validate(&DataValue::from("not-an-email")));
        assert!(!field.validate(&DataValue::Int(1)));
    }

    #[test]
    fn password_requires_func() {
        let err = FieldBuilder::new(FieldKind::Password).build().unwrap_err();
        assert!(matches!(err, SchemaError::ConfigError { .. }));
    }

    #[test]
    fn password_minimum_is_capped_at_five() {
        let field = FieldBuilder::new(FieldKind::Password)
            .min(2)
            .password_func(hash)
            .build()
            .unwrap();
        assert_eq!(field.constraints().min, Some(DataValue::Int(2)));
        assert!(!field.validate(&DataValue::from("a")));
        assert!(field.validate(&DataValue::from("abcd")));

        let defaulted = FieldBuilder::new(FieldKind::Password)
            .password_func(hash)
            .build()
            .unwrap();
        assert_eq!(defaulted.constraints().min, Some(DataValue::Int(5)));
        assert!(!defaulted.validate(&DataValue::from("abcd")));

        let longer = FieldBuilder::new(FieldKind::Password)
            .min(8)
            .max(4)
            .password_func(hash)
            .build()
            .unwrap();
        assert_eq!(longer.constraints().min, Some(DataValue::Int(5)));
        assert_eq!(longer.constraints().max, Some(DataValue::Int(5)));
        assert!(longer.validate(&DataValue::from("abcde")));
        assert!(!longer.validate(&DataValue::from("abcdef")));
    }

    #[test]
    fn password_func_skips_null() {
        let field = FieldBuilder::new(FieldKind::Password)
            .required(false)
            .password_func(|_| DataValue::from("hashed"))
            .build()
            .unwrap();
        assert_eq!(field.process(DataValue::Null), DataValue::Null);
        assert_eq!(field.process(DataValue::from("x")), DataValue::from("hashed"));
    }

    #[test]
    fn password_func_runs_last() {
        let field = FieldBuilder::new(FieldKind::Password)
            .post_processor(|v| match v {
                DataValue::String(s) => DataValue::String(s.trim().to_string()),
                other => other,
            })
            .password_func(hash)
            .build()
            .unwrap();
        assert_eq!(field.process(DataValue::from("  secret ")), DataValue::from("hashed:secret"));
    }

    #[test]
    fn process_without_processors_is_identity() {
        let field = FieldBuilder::new(FieldKind::Number).build().unwrap();
        assert!(!field.has_post_processors());
        assert_eq!(field.process(DataValue::Int(4)), DataValue::Int(4));
    }

    #[test]
    fn invalid_regexp_fails_at_build() {
        let err = FieldBuilder::new(FieldKind::String).regexp("(unclosed").build().unwrap_err();
        assert!(matches!(err, SchemaError::ConfigError { .. }));
    }

    #[test]
    fn irrelevant_options_are_ignored() {
        let field = FieldBuilder::new(FieldKind::Dict)
            .min(3)
            .regexp("(bad")
            .allowed_values(["x"])
            .build()
            .unwrap();
        assert!(field.constraints().min.is_none());
        assert!(field.constraints().regexp.is_none());
        assert!(field.validate(&DataValue::Object(Default::default())));
    }

    #[test]
    fn choice_membership() {
        let field = FieldBuilder::new(FieldKind::Choice)
            .choices(["draft", "published"])
            .build()
            .unwrap();
        assert!(field.validate(&DataValue::from("draft")));
        assert!(!field.validate(&DataValue::from("archived")));
    }

    #[test]
    fn number_range_membership() {
        let field = FieldBuilder::new(FieldKind::Number).range([1, 2, 3]).build().unwrap();
        assert!(field.validate(&DataValue::Float(2.0)));
        assert!(!field.validate(&DataValue::Int(4)));
        assert!(!field.validate(&DataValue::from("2")));
    }

    #[test]
    fn date_accepts_timestamps_and_datetimes() {
        let bound = chrono::DateTime::parse_from_rfc3339("2020-01-01T00:00:00+00:00").unwrap();
        let field = FieldBuilder::new(FieldKind::Date).min(bound).build().unwrap();
        let later = chrono::DateTime::parse_from_rfc3339("2021-06-01T00:00:00+00:00").unwrap();
        let earlier = chrono::DateTime::parse_from_rfc3339("2019-06-01T00:00:00+00:00").unwrap();

        assert!(field.validate(&DataValue::from(later)));
        assert!(!field.validate(&DataValue::from(earlier)));
        assert!(field.validate(&DataValue::Int(later.timestamp())));
        assert!(!field.validate(&DataValue::from("2021-06-01")));
    }

    #[test]
    fn validate_with_field_name_reports_field() {
        let field = FieldBuilder::new(FieldKind::Number).build().unwrap();
        let err = field
            .validate_with_field_name(&DataValue::from("x"), "age")
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("age"));
    }
}
