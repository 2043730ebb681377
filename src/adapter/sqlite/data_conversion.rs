//! SQLite数据转换模块
//!
//! 文档以 JSON 文本存放在 `data` 列中。JSON 无法直接表达的类型使用扩展标签
//! 保存，读取时还原为原来的 DataValue 类型：
//!
//! - 日期时间：`{"$date": "<rfc3339>"}`，以 `Z` 结尾的还原为 UTC
//! - 字节数组：`{"$binary": "<base64>"}`
//! - UUID：`{"$uuid": "<uuid>"}`
//! - ObjectId：`{"$oid": "<hex>"}`

use crate::error::SchemaResult;
use crate::types::*;
use base64::Engine;
use serde_json::{Map, Value};

const DATE_TAG: &str = "$date";
const BINARY_TAG: &str = "$binary";
const UUID_TAG: &str = "$uuid";
const OID_TAG: &str = "$oid";

/// 将文档编码为存储文本，`_id` 不写入 `data` 列
pub(crate) fn encode_document(document: &Document) -> SchemaResult<String> {
    let object: Map<String, Value> = document
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .map(|(key, value)| (key.clone(), data_value_to_stored_json(value)))
        .collect();
    Ok(serde_json::to_string(&Value::Object(object))?)
}

/// 从存储文本和行号还原文档
pub(crate) fn decode_document(id: i64, data: &str) -> SchemaResult<Document> {
    let value: Value = serde_json::from_str(data).map_err(|e| {
        crate::schema_error!(
            serialization,
            crate::i18n::tf("error.json_parse", &[("message", &e.to_string())])
        )
    })?;

    let mut document = match stored_json_to_data_value(value) {
        DataValue::Object(map) => map,
        other => {
            return Err(crate::schema_error!(
                serialization,
                format!("存储的文档不是对象: {}", other.type_name())
            ))
        }
    };
    document.insert(ID_FIELD.to_string(), DataValue::Int(id));
    Ok(document)
}

fn tagged(tag: &str, value: String) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(tag.to_string(), Value::String(value));
    Value::Object(map)
}

/// DataValue 转为带类型标签的 JSON
pub(crate) fn data_value_to_stored_json(value: &DataValue) -> Value {
    match value {
        DataValue::DateTime(dt) => tagged(DATE_TAG, dt.to_rfc3339()),
        DataValue::DateTimeUTC(dt) => tagged(
            DATE_TAG,
            dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        ),
        DataValue::Bytes(bytes) => tagged(
            BINARY_TAG,
            base64::engine::general_purpose::STANDARD.encode(bytes),
        ),
        DataValue::Uuid(uuid) => tagged(UUID_TAG, uuid.to_string()),
        DataValue::ObjectId(oid) => tagged(OID_TAG, oid.to_hex()),
        DataValue::Array(items) => {
            Value::Array(items.iter().map(data_value_to_stored_json).collect())
        }
        DataValue::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), data_value_to_stored_json(v)))
                .collect(),
        ),
        other => other.to_json_value(),
    }
}

/// 带类型标签的 JSON 还原为 DataValue
pub(crate) fn stored_json_to_data_value(value: Value) -> DataValue {
    match value {
        Value::Object(map) => {
            if let Some(restored) = restore_tagged(&map) {
                return restored;
            }
            DataValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, stored_json_to_data_value(v)))
                    .collect(),
            )
        }
        Value::Array(items) => {
            DataValue::Array(items.into_iter().map(stored_json_to_data_value).collect())
        }
        other => json_value_to_data_value(other),
    }
}

fn restore_tagged(map: &Map<String, Value>) -> Option<DataValue> {
    if map.len() != 1 {
        return None;
    }
    let (tag, value) = map.iter().next()?;
    let text = value.as_str()?;

    match tag.as_str() {
        DATE_TAG => {
            let dt = chrono::DateTime::parse_from_rfc3339(text).ok()?;
            if text.ends_with('Z') {
                Some(DataValue::DateTimeUTC(dt.with_timezone(&chrono::Utc)))
            } else {
                Some(DataValue::DateTime(dt))
            }
        }
        BINARY_TAG => base64::engine::general_purpose::STANDARD
            .decode(text)
            .ok()
            .map(DataValue::Bytes),
        UUID_TAG => uuid::Uuid::parse_str(text).ok().map(DataValue::Uuid),
        OID_TAG => ObjectId::parse_str(text).ok().map(DataValue::ObjectId),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn typed_values_survive_storage() {
        let local = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap();
        let uuid = uuid::Uuid::new_v4();

        let doc = document! {
            "local" => local,
            "utc" => utc,
            "blob" => vec![1u8, 2, 3],
            "uuid" => uuid,
            "nested" => document! { "when" => utc, "n" => 1.5 },
        };

        let text = encode_document(&doc).unwrap();
        let restored = decode_document(9, &text).unwrap();

        assert_eq!(restored["local"], DataValue::DateTime(local));
        assert_eq!(restored["utc"], DataValue::DateTimeUTC(utc));
        assert_eq!(restored["blob"], DataValue::Bytes(vec![1, 2, 3]));
        assert_eq!(restored["uuid"], DataValue::Uuid(uuid));
        assert_eq!(restored["nested"], DataValue::from(document! { "when" => utc, "n" => 1.5 }));
        assert_eq!(restored["_id"], DataValue::Int(9));
    }

    #[test]
    fn id_is_kept_out_of_the_payload() {
        let text = encode_document(&document! { "_id" => 3, "name" => "x" }).unwrap();
        assert!(!text.contains("_id"));
    }

    #[test]
    fn plain_objects_with_tag_like_keys_stay_objects() {
        let doc = document! { "q" => document! { "$date" => 5 } };
        let restored = decode_document(1, &encode_document(&doc).unwrap()).unwrap();
        assert_eq!(restored["q"], DataValue::from(document! { "$date" => 5 }));
    }

    #[test]
    fn malformed_payload_is_a_serialization_error() {
        let err = decode_document(1, "{not json").unwrap_err();
        assert!(matches!(err, crate::error::SchemaError::SerializationError { .. }));
    }
}
