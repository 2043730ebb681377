//! 校验器链
//!
//! 每个校验器只负责一条规则，字段定义按种类组装校验器并对结果取合取。
//! 除 `Presence` 外，所有校验器在字段可选且值缺失时直接通过。

use crate::model::field_types::FieldDefinition;
use crate::types::DataValue;
use serde::{Deserialize, Serialize};

/// 单条校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validator {
    /// 必填字段不能缺失
    Presence,
    /// 数值类型
    Number,
    /// 日期：数值时间戳或日期时间
    Date,
    /// 字符串类型
    String,
    /// 数值下限
    Min,
    /// 数值上限
    Max,
    /// 取值集合
    Range,
    /// 字符串长度下限
    StringMin,
    /// 字符串长度上限
    StringMax,
    /// 正则匹配（从开头匹配）
    Regexp,
    /// 枚举选项
    Choice,
    /// 映射及其子字段
    Dict,
    /// 列表及其元素约束
    List,
}

impl Validator {
    /// 校验单个值
    pub fn validate(&self, value: &DataValue, field: &FieldDefinition) -> bool {
        if *self != Validator::Presence && !field.is_required() && value.is_null() {
            return true;
        }

        let constraints = field.constraints();
        match self {
            Validator::Presence => !(field.is_required() && value.is_null()),
            Validator::Number => value.is_number(),
            Validator::Date => {
                value.is_number()
                    || matches!(value, DataValue::DateTime(_) | DataValue::DateTimeUTC(_))
            }
            Validator::String => matches!(value, DataValue::String(_)),
            Validator::Min => match (&constraints.min, value.as_f64()) {
                (Some(min), Some(v)) => min.as_f64().map_or(true, |min| v >= min),
                _ => true,
            },
            Validator::Max => match (&constraints.max, value.as_f64()) {
                (Some(max), Some(v)) => max.as_f64().map_or(true, |max| v <= max),
                _ => true,
            },
            Validator::Range => match &constraints.range {
                Some(range) => range.iter().any(|member| member.loose_eq(value)),
                None => true,
            },
            Validator::StringMin => match (&constraints.min, string_len(value)) {
                (Some(min), Some(len)) => min.as_f64().map_or(true, |min| len as f64 >= min),
                _ => true,
            },
            Validator::StringMax => match (&constraints.max, string_len(value)) {
                (Some(max), Some(len)) => max.as_f64().map_or(true, |max| len as f64 <= max),
                _ => true,
            },
            Validator::Regexp => match &constraints.regexp {
                Some(pattern) => value.as_str().is_some_and(|s| pattern.is_match(s)),
                None => true,
            },
            Validator::Choice => match &constraints.choices {
                Some(choices) => choices.iter().any(|choice| choice.loose_eq(value)),
                None => true,
            },
            Validator::Dict => validate_dict(value, field),
            Validator::List => validate_list(value, field),
        }
    }
}

fn string_len(value: &DataValue) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

fn validate_dict(value: &DataValue, field: &FieldDefinition) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };

    let Some(allowed_fields) = &field.constraints().allowed_fields else {
        return true;
    };

    // 未声明的键不做校验；值为 null 的键跳过
    allowed_fields.iter().all(|(name, sub_field)| match map.get(name) {
        Some(sub_value) if !sub_value.is_null() => sub_field.validate(sub_value),
        _ => true,
    })
}

fn validate_list(value: &DataValue, field: &FieldDefinition) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    let constraints = field.constraints();

    if let Some(allowed_values) = &constraints.allowed_values {
        let all_allowed = items
            .iter()
            .all(|item| allowed_values.iter().any(|allowed| allowed.loose_eq(item)));
        if !all_allowed {
            return false;
        }
    }

    if let Some(allowed_type) = &constraints.allowed_type {
        if !items.iter().all(|item| allowed_type.validate(item)) {
            return false;
        }
    }

    if let Some(type_map) = &constraints.allowed_type_map {
        let all_match = items.iter().all(|item| {
            let Some(record) = item.as_object() else {
                return false;
            };
            type_map
                .iter()
                .all(|(key, kind)| record.get(key).is_some_and(|v| kind.matches(v)))
        });
        if !all_match {
            return false;
        }
    }

    true
}
