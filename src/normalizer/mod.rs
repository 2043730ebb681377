//! 标识符规范化器
//!
//! 在每次跨越后端边界时递归改写查询/文档树：出站把规范标识符和 `_id`
//! 上下文中的文本改写为后端原生主键类型，入站再还原为规范标识符。
//! 遍历策略只有一份，各后端只提供自己的 `IdentifierCodec`。

use crate::error::SchemaResult;
use crate::types::{DataValue, Document, IdType, ObjectId, SchemaId, ID_FIELD};

/// 后端原生主键的编解码
pub trait IdentifierCodec: Send + Sync {
    /// 后端名称，用于错误信息
    fn backend(&self) -> &'static str;

    /// 规范 ID 转原生值
    fn encode(&self, id: &IdType) -> SchemaResult<DataValue>;

    /// `_id` 上下文中的裸文本转原生值
    fn coerce_text(&self, text: &str) -> SchemaResult<DataValue>;

    /// 原生值还原为规范 ID；`in_id_field` 表示该值直接位于 `_id` 键下
    fn decode(&self, value: &DataValue, in_id_field: bool) -> Option<IdType>;
}

/// 嵌入式存储：整数主键
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedIdCodec;

impl IdentifierCodec for EmbeddedIdCodec {
    fn backend(&self) -> &'static str {
        "embedded"
    }

    fn encode(&self, id: &IdType) -> SchemaResult<DataValue> {
        match id {
            IdType::Number(n) => Ok(DataValue::Int(*n)),
            IdType::String(s) => self.coerce_text(s),
        }
    }

    fn coerce_text(&self, text: &str) -> SchemaResult<DataValue> {
        text.trim()
            .parse::<i64>()
            .map(DataValue::Int)
            .map_err(|_| crate::schema_error!(invalid_id, text, self.backend()))
    }

    fn decode(&self, value: &DataValue, in_id_field: bool) -> Option<IdType> {
        match value {
            DataValue::Int(n) if in_id_field => Some(IdType::Number(*n)),
            _ => None,
        }
    }
}

/// 网络文档存储：12 字节 ObjectId
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdCodec;

impl IdentifierCodec for ObjectIdCodec {
    fn backend(&self) -> &'static str {
        "networked"
    }

    fn encode(&self, id: &IdType) -> SchemaResult<DataValue> {
        match id {
            IdType::String(s) => self.coerce_text(s),
            IdType::Number(n) => Err(crate::schema_error!(invalid_id, n, self.backend())),
        }
    }

    fn coerce_text(&self, text: &str) -> SchemaResult<DataValue> {
        ObjectId::parse_str(text).map(DataValue::ObjectId)
    }

    fn decode(&self, value: &DataValue, _in_id_field: bool) -> Option<IdType> {
        match value {
            DataValue::ObjectId(oid) => Some(IdType::String(oid.to_hex())),
            _ => None,
        }
    }
}

/// 出站规范化：规范标识符与 `_id` 上下文中的文本改写为原生主键
///
/// 已是原生类型的值保持不变，因此重复调用结果不变
pub fn normalize(tree: &Document, codec: &dyn IdentifierCodec) -> SchemaResult<Document> {
    normalize_map(tree, codec, false)
}

/// 入站还原：原生主键改写为 `DataValue::Id`
pub fn denormalize(tree: Document, codec: &dyn IdentifierCodec) -> Document {
    tree.into_iter()
        .map(|(key, value)| {
            let in_id_field = key == ID_FIELD;
            (key, denormalize_value(value, codec, in_id_field))
        })
        .collect()
}

fn normalize_map(
    map: &Document,
    codec: &dyn IdentifierCodec,
    id_context: bool,
) -> SchemaResult<Document> {
    let mut result = Document::with_capacity(map.len());
    for (key, value) in map {
        let rewritten = if key == ID_FIELD {
            normalize_id_value(value, codec)?
        } else if id_context {
            match value {
                // 嵌套映射不继续传播标识符上下文
                DataValue::Object(_) => normalize_value(value, codec)?,
                _ => normalize_id_value(value, codec)?,
            }
        } else {
            normalize_value(value, codec)?
        };
        result.insert(key.clone(), rewritten);
    }
    Ok(result)
}

/// 标识符上下文中的值：文本和文本列表都做强制转换
fn normalize_id_value(value: &DataValue, codec: &dyn IdentifierCodec) -> SchemaResult<DataValue> {
    match value {
        DataValue::String(text) => codec.coerce_text(text),
        DataValue::Array(items) => items
            .iter()
            .map(|item| match item {
                DataValue::String(text) => codec.coerce_text(text),
                other => normalize_value(other, codec),
            })
            .collect::<SchemaResult<Vec<_>>>()
            .map(DataValue::Array),
        DataValue::Object(map) => normalize_map(map, codec, true).map(DataValue::Object),
        other => normalize_value(other, codec),
    }
}

fn normalize_value(value: &DataValue, codec: &dyn IdentifierCodec) -> SchemaResult<DataValue> {
    match value {
        DataValue::Id(SchemaId::Single(id)) => codec.encode(id),
        DataValue::Id(SchemaId::List(ids)) => ids
            .iter()
            .map(|id| codec.encode(id))
            .collect::<SchemaResult<Vec<_>>>()
            .map(DataValue::Array),
        DataValue::Object(map) => normalize_map(map, codec, false).map(DataValue::Object),
        DataValue::Array(items) => items
            .iter()
            .map(|item| normalize_value(item, codec))
            .collect::<SchemaResult<Vec<_>>>()
            .map(DataValue::Array),
        other => Ok(other.clone()),
    }
}

fn denormalize_value(value: DataValue, codec: &dyn IdentifierCodec, in_id_field: bool) -> DataValue {
    if let Some(id) = codec.decode(&value, in_id_field) {
        return DataValue::Id(SchemaId::Single(id));
    }
    match value {
        DataValue::Object(map) => DataValue::Object(denormalize(map, codec)),
        DataValue::Array(items) => DataValue::Array(
            items
                .into_iter()
                .map(|item| denormalize_value(item, codec, false))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use crate::error::SchemaError;

    const HEX_A: &str = "507f1f77bcf86cd799439011";
    const HEX_B: &str = "507f191e810c19729de860ea";

    fn oid(hex: &str) -> DataValue {
        DataValue::ObjectId(ObjectId::parse_str(hex).unwrap())
    }

    fn contains_canonical_id(value: &DataValue) -> bool {
        match value {
            DataValue::Id(_) => true,
            DataValue::Object(map) => map.values().any(contains_canonical_id),
            DataValue::Array(items) => items.iter().any(contains_canonical_id),
            _ => false,
        }
    }

    #[test]
    fn canonical_ids_become_native_everywhere() {
        let tree = document! {
            "owner" => SchemaId::single(HEX_A),
            "refs" => vec![DataValue::from(SchemaId::list([HEX_A, HEX_B]))],
            "nested" => document! { "inner" => SchemaId::single(HEX_B) },
        };
        let normalized = normalize(&tree, &ObjectIdCodec).unwrap();

        assert_eq!(normalized["owner"], oid(HEX_A));
        assert_eq!(
            normalized["refs"],
            DataValue::Array(vec![DataValue::Array(vec![oid(HEX_A), oid(HEX_B)])])
        );
        assert!(!contains_canonical_id(&DataValue::Object(normalized)));
    }

    #[test]
    fn id_key_coerces_text_and_operator_lists() {
        let tree = document! {
            "_id" => document! { "$in" => vec![HEX_A, HEX_B] },
        };
        let normalized = normalize(&tree, &ObjectIdCodec).unwrap();
        let expected = document! { "$in" => vec![oid(HEX_A), oid(HEX_B)] };
        assert_eq!(normalized["_id"], DataValue::Object(expected));
    }

    #[test]
    fn id_context_does_not_leak_into_other_fields() {
        let tree = document! {
            "_id" => "42",
            "title" => "42",
            "tags" => vec!["7"],
            "meta" => document! { "code" => "9" },
        };
        let normalized = normalize(&tree, &EmbeddedIdCodec).unwrap();
        assert_eq!(normalized["_id"], DataValue::Int(42));
        assert_eq!(normalized["title"], DataValue::from("42"));
        assert_eq!(normalized["tags"], DataValue::from(vec!["7"]));
        assert_eq!(normalized["meta"], DataValue::from(document! { "code" => "9" }));
    }

    #[test]
    fn nested_mapping_inside_id_context_is_not_coerced() {
        let tree = document! {
            "_id" => document! { "$not" => document! { "$eq" => "5" }, "$ne" => "6" },
        };
        let normalized = normalize(&tree, &EmbeddedIdCodec).unwrap();
        let expected = document! {
            "$not" => document! { "$eq" => "5" },
            "$ne" => 6,
        };
        assert_eq!(normalized["_id"], DataValue::Object(expected));
    }

    #[test]
    fn normalize_is_idempotent() {
        let tree = document! {
            "_id" => document! { "$in" => vec![HEX_A] },
            "owner" => SchemaId::single(HEX_B),
            "list" => vec![DataValue::from(document! { "_id" => HEX_A })],
        };
        let once = normalize(&tree, &ObjectIdCodec).unwrap();
        let twice = normalize(&once, &ObjectIdCodec).unwrap();
        assert_eq!(once, twice);

        let embedded = document! { "_id" => "3", "ref" => SchemaId::single(4) };
        let once = normalize(&embedded, &EmbeddedIdCodec).unwrap();
        assert_eq!(normalize(&once, &EmbeddedIdCodec).unwrap(), once);
    }

    #[test]
    fn uncoercible_text_is_rejected() {
        let err = normalize(&document! { "_id" => "abc" }, &EmbeddedIdCodec).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));

        let err = normalize(&document! { "_id" => "zz" }, &ObjectIdCodec).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));

        let err = normalize(&document! { "ref" => SchemaId::single(7) }, &ObjectIdCodec).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));
    }

    #[test]
    fn denormalize_restores_canonical_ids() {
        let stored = document! { "_id" => 5, "count" => 5 };
        let restored = denormalize(stored, &EmbeddedIdCodec);
        assert_eq!(restored["_id"], DataValue::from(SchemaId::single(5)));
        assert_eq!(restored["count"], DataValue::Int(5));

        let stored = document! { "_id" => oid(HEX_A), "refs" => vec![oid(HEX_B)] };
        let restored = denormalize(stored, &ObjectIdCodec);
        assert_eq!(restored["_id"], DataValue::from(SchemaId::single(HEX_A)));
        assert_eq!(
            restored["refs"],
            DataValue::Array(vec![DataValue::from(SchemaId::single(HEX_B))])
        );
    }

    #[test]
    fn roundtrip_through_native_form() {
        let tree = document! { "_id" => SchemaId::single(HEX_A), "name" => "x" };
        let native = normalize(&tree, &ObjectIdCodec).unwrap();
        assert_eq!(denormalize(native, &ObjectIdCodec), tree);
    }
}
