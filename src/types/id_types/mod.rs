use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SchemaError, SchemaResult};

/// ID 类型
///
/// 记录实例持有的不透明标识符，由后端返回的原生主键反向转换而来
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    /// 数字 ID（嵌入式存储）
    Number(i64),
    /// 字符串 ID（网络文档存储的十六进制 ObjectId）
    String(String),
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdType::Number(n) => write!(f, "{}", n),
            IdType::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for IdType {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for IdType {
    fn from(value: i32) -> Self {
        Self::Number(value as i64)
    }
}

impl From<String> for IdType {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for IdType {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// 规范标识符
///
/// 与后端无关的标识符包装，区分单个 ID 与 ID 列表。
/// 只有标识符规范化器会把它解析为后端原生主键类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaId {
    /// 单个 ID
    Single(IdType),
    /// ID 列表
    List(Vec<IdType>),
}

impl SchemaId {
    /// 创建单个 ID
    pub fn single(id: impl Into<IdType>) -> Self {
        Self::Single(id.into())
    }

    /// 创建 ID 列表
    pub fn list<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IdType>,
    {
        Self::List(ids.into_iter().map(Into::into).collect())
    }

    /// 是否为列表形式
    pub fn is_list(&self) -> bool {
        matches!(self, SchemaId::List(_))
    }
}

impl From<IdType> for SchemaId {
    fn from(value: IdType) -> Self {
        Self::Single(value)
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaId::Single(id) => write!(f, "{}", id),
            SchemaId::List(ids) => {
                let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// 12 字节对象标识符（网络文档存储原生主键）
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(bson::oid::ObjectId);

impl ObjectId {
    /// 从原始字节创建
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bson::oid::ObjectId::from_bytes(bytes))
    }

    /// 从 24 位十六进制字符串解析
    pub fn parse_str(s: &str) -> SchemaResult<Self> {
        bson::oid::ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| SchemaError::InvalidIdentifier {
                value: s.to_string(),
                backend: "networked".to_string(),
            })
    }

    /// 原始字节
    pub const fn bytes(&self) -> [u8; 12] {
        self.0.bytes()
    }

    /// 十六进制表示
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl From<bson::oid::ObjectId> for ObjectId {
    fn from(value: bson::oid::ObjectId) -> Self {
        Self(value)
    }
}

impl From<ObjectId> for bson::oid::ObjectId {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

impl std::str::FromStr for ObjectId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_hex_roundtrip() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(oid.bytes()[0], 0x50);
    }

    #[test]
    fn object_id_rejects_bad_input() {
        assert!(ObjectId::parse_str("not-an-id").is_err());
        assert!(ObjectId::parse_str("507f1f77bcf86cd79943901z").is_err());
        assert!(ObjectId::parse_str("").is_err());
    }

    #[test]
    fn object_id_matches_bson_representation() {
        let native = bson::oid::ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let oid = ObjectId::from(native);
        assert_eq!(oid, ObjectId::from_bytes(native.bytes()));
        assert_eq!(oid.to_string(), native.to_hex());
        assert_eq!(bson::oid::ObjectId::from(oid), native);
        assert_eq!(format!("{:?}", oid), "ObjectId(\"507f1f77bcf86cd799439011\")");
    }

    #[test]
    fn schema_id_display() {
        assert_eq!(SchemaId::single(7).to_string(), "7");
        assert_eq!(SchemaId::list(["a", "b"]).to_string(), "[a, b]");
        assert!(SchemaId::list(Vec::<i64>::new()).is_list());
    }
}
