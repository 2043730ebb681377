use base64::Engine;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::id_types::{IdType, ObjectId, SchemaId};

/// 查询/文档树：字段名到值的映射
pub type Document = HashMap<String, DataValue>;

/// 通用数据值类型 - 支持跨后端的数据表示
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 无符号整数
    UInt(u64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 字节数组
    Bytes(Vec<u8>),
    /// 日期时间
    DateTime(DateTime<FixedOffset>),
    /// UTC日期时间
    DateTimeUTC(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
    /// JSON 对象
    Json(serde_json::Value),
    /// 数组
    Array(Vec<DataValue>),
    /// 对象/文档
    Object(HashMap<String, DataValue>),
    /// 规范标识符（与后端无关）
    Id(SchemaId),
    /// 网络文档存储的原生对象标识符
    ObjectId(ObjectId),
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::UInt(u) => write!(f, "{}", u),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Bytes(bytes) => write!(f, "[{} bytes]", bytes.len()),
            DataValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            DataValue::DateTimeUTC(dt) => write!(f, "{}", dt.to_rfc3339()),
            DataValue::Uuid(uuid) => write!(f, "{}", uuid),
            DataValue::Json(json) => write!(f, "{}", json),
            DataValue::Array(_) | DataValue::Object(_) => {
                write!(f, "{}", self.to_json_value())
            }
            DataValue::Id(id) => write!(f, "Id({})", id),
            DataValue::ObjectId(oid) => write!(f, "ObjectId(\"{}\")", oid),
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug 与 Display 保持一致，显示实际值而不是类型构造函数
        write!(f, "{}", self)
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::UInt(_) => "unsigned_integer",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
            DataValue::Bytes(_) => "bytes",
            DataValue::DateTime(_) => "datetime",
            DataValue::DateTimeUTC(_) => "datetime",
            DataValue::Uuid(_) => "uuid",
            DataValue::Json(_) => "json",
            DataValue::Array(_) => "array",
            DataValue::Object(_) => "object",
            DataValue::Id(_) => "id",
            DataValue::ObjectId(_) => "object_id",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// 是否为数值类型
    pub fn is_number(&self) -> bool {
        matches!(self, DataValue::Int(_) | DataValue::UInt(_) | DataValue::Float(_))
    }

    /// 数值视图；日期时间按 Unix 秒计算
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int(i) => Some(*i as f64),
            DataValue::UInt(u) => Some(*u as f64),
            DataValue::Float(f) => Some(*f),
            DataValue::DateTime(dt) => Some(dt.timestamp() as f64),
            DataValue::DateTimeUTC(dt) => Some(dt.timestamp() as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<DataValue>> {
        match self {
            DataValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, DataValue>> {
        match self {
            DataValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// 按点分路径读取嵌套值，数组段支持数字下标
    pub fn get_path(&self, path: &str) -> Option<&DataValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                DataValue::Object(obj) => obj.get(segment)?,
                DataValue::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// 宽松相等：数值跨整数/浮点比较，其余按结构相等
    pub fn loose_eq(&self, other: &DataValue) -> bool {
        if self.is_number() && other.is_number() {
            return self.as_f64() == other.as_f64();
        }
        match (self, other) {
            (DataValue::Array(a), DataValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (DataValue::Object(a), DataValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map(|w| v.loose_eq(w)).unwrap_or(false))
            }
            _ => self == other,
        }
    }

    /// 同类值比较；类别不同时返回 None
    pub fn partial_compare(&self, other: &DataValue) -> Option<Ordering> {
        if self.type_rank() != other.type_rank() {
            return None;
        }
        Some(self.sort_cmp(other))
    }

    /// 排序用的全序比较
    ///
    /// 类别顺序：null < 数值 < 字符串 < 对象 < 数组 < 字节 < 标识符 < 布尔 < 日期时间
    pub fn sort_cmp(&self, other: &DataValue) -> Ordering {
        let rank = self.type_rank().cmp(&other.type_rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (DataValue::Bool(a), DataValue::Bool(b)) => a.cmp(b),
            (DataValue::String(a), DataValue::String(b)) => a.cmp(b),
            (DataValue::Bytes(a), DataValue::Bytes(b)) => a.cmp(b),
            (DataValue::ObjectId(a), DataValue::ObjectId(b)) => a.cmp(b),
            (DataValue::Array(a), DataValue::Array(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.sort_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (DataValue::Object(a), DataValue::Object(b)) => {
                let mut a_keys: Vec<&String> = a.keys().collect();
                let mut b_keys: Vec<&String> = b.keys().collect();
                a_keys.sort();
                b_keys.sort();
                for (ka, kb) in a_keys.iter().zip(&b_keys) {
                    let ord = ka.cmp(kb).then_with(|| a[*ka].sort_cmp(&b[*kb]));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a_keys.len().cmp(&b_keys.len())
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            DataValue::Null => 0,
            DataValue::Int(_) | DataValue::UInt(_) | DataValue::Float(_) => 1,
            DataValue::String(_) | DataValue::Uuid(_) => 2,
            DataValue::Object(_) | DataValue::Json(_) => 3,
            DataValue::Array(_) => 4,
            DataValue::Bytes(_) => 5,
            DataValue::Id(_) | DataValue::ObjectId(_) => 6,
            DataValue::Bool(_) => 7,
            DataValue::DateTime(_) | DataValue::DateTimeUTC(_) => 8,
        }
    }

    /// 转换为 JSON 字符串
    pub fn to_json_string(&self) -> Result<String, crate::error::SchemaError> {
        serde_json::to_string(&self.to_json_value()).map_err(|e| {
            crate::schema_error!(serialization, format!("DataValue 转换为 JSON 失败: {}", e))
        })
    }

    /// 从 JSON 字符串解析（按值结构还原，而非带类型标签的格式）
    pub fn from_json_string(json: &str) -> Result<Self, crate::error::SchemaError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            crate::schema_error!(serialization, format!("JSON 解析为 DataValue 失败: {}", e))
        })?;
        Ok(json_value_to_data_value(value))
    }

    /// 转换为 JSON 值
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::UInt(u) => serde_json::Value::Number(serde_json::Number::from(*u)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
            // 将字节数组转换为 base64 字符串
            DataValue::Bytes(b) => serde_json::Value::String(
                base64::engine::general_purpose::STANDARD.encode(b),
            ),
            DataValue::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            DataValue::DateTimeUTC(dt) => serde_json::Value::String(dt.to_rfc3339()),
            DataValue::Uuid(u) => serde_json::Value::String(u.to_string()),
            DataValue::Json(j) => j.clone(),
            DataValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|item| item.to_json_value()).collect())
            }
            DataValue::Object(obj) => {
                let json_object: serde_json::Map<String, serde_json::Value> = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect();
                serde_json::Value::Object(json_object)
            }
            DataValue::Id(SchemaId::Single(id)) => id_to_json(id),
            DataValue::Id(SchemaId::List(ids)) => {
                serde_json::Value::Array(ids.iter().map(id_to_json).collect())
            }
            DataValue::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
        }
    }

    /// 期望Object类型，如果不是则返回错误
    pub fn expect_object(self) -> Result<HashMap<String, DataValue>, crate::error::SchemaError> {
        match self {
            DataValue::Object(map) => Ok(map),
            other => Err(crate::schema_error!(
                serialization,
                format!("期望Object类型，但收到: {}", other.type_name())
            )),
        }
    }
}

fn id_to_json(id: &IdType) -> serde_json::Value {
    match id {
        IdType::Number(n) => serde_json::Value::Number(serde_json::Number::from(*n)),
        IdType::String(s) => serde_json::Value::String(s.clone()),
    }
}

/// 运行时值类别，用于列表字段的按键类型约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// 任意非空值
    Any,
    Bool,
    /// 整数（有符号或无符号）
    Integer,
    Float,
    /// 整数或浮点数
    Number,
    String,
    DateTime,
    Array,
    Object,
    /// 规范标识符或后端原生标识符
    Id,
}

impl ValueKind {
    /// 判断值是否属于该类别
    pub fn matches(&self, value: &DataValue) -> bool {
        match self {
            ValueKind::Any => !value.is_null(),
            ValueKind::Bool => matches!(value, DataValue::Bool(_)),
            ValueKind::Integer => matches!(value, DataValue::Int(_) | DataValue::UInt(_)),
            ValueKind::Float => matches!(value, DataValue::Float(_)),
            ValueKind::Number => value.is_number(),
            ValueKind::String => matches!(value, DataValue::String(_)),
            ValueKind::DateTime => {
                matches!(value, DataValue::DateTime(_) | DataValue::DateTimeUTC(_))
            }
            ValueKind::Array => matches!(value, DataValue::Array(_)),
            ValueKind::Object => matches!(value, DataValue::Object(_)),
            ValueKind::Id => matches!(value, DataValue::Id(_) | DataValue::ObjectId(_)),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<u64> for DataValue {
    fn from(value: u64) -> Self {
        DataValue::UInt(value)
    }
}

impl From<f32> for DataValue {
    fn from(value: f32) -> Self {
        DataValue::Float(value as f64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DataValue {
    fn from(value: Vec<u8>) -> Self {
        DataValue::Bytes(value)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(value: DateTime<Utc>) -> Self {
        DataValue::DateTimeUTC(value)
    }
}

impl From<DateTime<FixedOffset>> for DataValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        DataValue::DateTime(value)
    }
}

impl From<Uuid> for DataValue {
    fn from(value: Uuid) -> Self {
        DataValue::Uuid(value)
    }
}

impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        json_value_to_data_value(value)
    }
}

impl From<HashMap<String, DataValue>> for DataValue {
    fn from(value: HashMap<String, DataValue>) -> Self {
        DataValue::Object(value)
    }
}

impl From<IdType> for DataValue {
    fn from(value: IdType) -> Self {
        DataValue::Id(SchemaId::Single(value))
    }
}

impl From<&IdType> for DataValue {
    fn from(value: &IdType) -> Self {
        DataValue::Id(SchemaId::Single(value.clone()))
    }
}

impl From<SchemaId> for DataValue {
    fn from(value: SchemaId) -> Self {
        DataValue::Id(value)
    }
}

impl From<ObjectId> for DataValue {
    fn from(value: ObjectId) -> Self {
        DataValue::ObjectId(value)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(value: Vec<DataValue>) -> Self {
        DataValue::Array(value)
    }
}

impl From<Vec<&str>> for DataValue {
    fn from(value: Vec<&str>) -> Self {
        DataValue::Array(value.into_iter().map(DataValue::from).collect())
    }
}

impl From<Vec<String>> for DataValue {
    fn from(value: Vec<String>) -> Self {
        DataValue::Array(value.into_iter().map(DataValue::String).collect())
    }
}

impl From<Vec<i64>> for DataValue {
    fn from(value: Vec<i64>) -> Self {
        DataValue::Array(value.into_iter().map(DataValue::Int).collect())
    }
}

impl<T> From<Option<T>> for DataValue
where
    T: Into<DataValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}

/// 按点分路径读取文档中的值，路径首段是文档的键
pub fn document_path<'a>(document: &'a Document, path: &str) -> Option<&'a DataValue> {
    match path.split_once('.') {
        None => document.get(path),
        Some((head, rest)) => document.get(head)?.get_path(rest),
    }
}

/// 将 serde_json::Value 正确转换为对应的 DataValue 类型
/// 而不是简单包装为 DataValue::Json
pub fn json_value_to_data_value(value: serde_json::Value) -> DataValue {
    match value {
        serde_json::Value::Null => DataValue::Null,
        serde_json::Value::Bool(b) => DataValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                DataValue::UInt(u)
            } else if let Some(f) = n.as_f64() {
                DataValue::Float(f)
            } else {
                DataValue::Json(serde_json::Value::Number(n))
            }
        }
        serde_json::Value::String(s) => DataValue::String(s),
        serde_json::Value::Array(arr) => {
            DataValue::Array(arr.into_iter().map(json_value_to_data_value).collect())
        }
        serde_json::Value::Object(obj) => DataValue::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_value_to_data_value(v)))
                .collect(),
        ),
    }
}
