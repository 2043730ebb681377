//! MongoDB工具函数模块
//!
//! 包含 DataValue 与 BSON 之间的转换

use crate::types::*;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{self, Binary, Bson};

/// 将DataValue转换为BSON值
pub(crate) fn data_value_to_bson(value: &DataValue) -> Bson {
    match value {
        DataValue::Null => Bson::Null,
        DataValue::Bool(b) => Bson::Boolean(*b),
        DataValue::Int(i) => Bson::Int64(*i),
        DataValue::UInt(u) => i64::try_from(*u)
            .map(Bson::Int64)
            .unwrap_or(Bson::Double(*u as f64)),
        DataValue::Float(f) => Bson::Double(*f),
        DataValue::String(s) => Bson::String(s.clone()),
        DataValue::Bytes(bytes) => Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: bytes.clone(),
        }),
        // MongoDB 只保存 UTC 毫秒时间戳
        DataValue::DateTime(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
        DataValue::DateTimeUTC(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
        DataValue::Uuid(uuid) => Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }),
        DataValue::Json(json) => bson::to_bson(json).unwrap_or_else(|_| Bson::String(json.to_string())),
        DataValue::Array(items) => Bson::Array(items.iter().map(data_value_to_bson).collect()),
        DataValue::Object(map) => Bson::Document(document_to_bson(map)),
        DataValue::ObjectId(oid) => Bson::ObjectId((*oid).into()),
        // 规范标识符应已在上层规范化，这里只做兜底
        DataValue::Id(_) => bson::to_bson(&value.to_json_value()).unwrap_or(Bson::Null),
    }
}

/// 将文档转换为BSON文档
pub(crate) fn document_to_bson(document: &Document) -> bson::Document {
    let mut result = bson::Document::new();
    for (key, value) in document {
        result.insert(key.clone(), data_value_to_bson(value));
    }
    result
}

/// 将BSON转换为DataValue
pub(crate) fn bson_to_data_value(value: Bson) -> DataValue {
    match value {
        Bson::Null | Bson::Undefined => DataValue::Null,
        Bson::Boolean(b) => DataValue::Bool(b),
        Bson::Int32(i) => DataValue::Int(i as i64),
        Bson::Int64(i) => DataValue::Int(i),
        Bson::Double(d) => DataValue::Float(d),
        Bson::String(s) => DataValue::String(s),
        Bson::DateTime(dt) => chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
            .map(DataValue::DateTimeUTC)
            .unwrap_or(DataValue::Null),
        Bson::ObjectId(oid) => DataValue::ObjectId(oid.into()),
        Bson::Binary(bin) => match bin.subtype {
            BinarySubtype::Uuid => uuid::Uuid::from_slice(&bin.bytes)
                .map(DataValue::Uuid)
                .unwrap_or(DataValue::Bytes(bin.bytes)),
            _ => DataValue::Bytes(bin.bytes),
        },
        Bson::Array(items) => DataValue::Array(items.into_iter().map(bson_to_data_value).collect()),
        Bson::Document(doc) => DataValue::Object(bson_to_document(doc)),
        Bson::Symbol(symbol) => DataValue::String(symbol),
        other => DataValue::String(other.to_string()),
    }
}

/// 将BSON文档转换为文档
pub(crate) fn bson_to_document(document: bson::Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_data_value(value)))
        .collect()
}
