use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};

/// 查询操作符（Mongo 风格的 `$` 前缀操作符）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    /// 等于
    Eq,
    /// 不等于
    Ne,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
    /// 在列表中
    In,
    /// 不在列表中
    NotIn,
    /// 字段是否存在
    Exists,
    /// 正则匹配
    Regex,
    /// 取反
    Not,
}

impl QueryOperator {
    /// 从 `$` 前缀的键解析操作符
    pub fn parse(key: &str) -> SchemaResult<Self> {
        match key {
            "$eq" => Ok(QueryOperator::Eq),
            "$ne" => Ok(QueryOperator::Ne),
            "$gt" => Ok(QueryOperator::Gt),
            "$gte" => Ok(QueryOperator::Gte),
            "$lt" => Ok(QueryOperator::Lt),
            "$lte" => Ok(QueryOperator::Lte),
            "$in" => Ok(QueryOperator::In),
            "$nin" => Ok(QueryOperator::NotIn),
            "$exists" => Ok(QueryOperator::Exists),
            "$regex" => Ok(QueryOperator::Regex),
            "$not" => Ok(QueryOperator::Not),
            other => Err(SchemaError::QueryError {
                message: format!("不支持的查询操作符: {}", other),
            }),
        }
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    /// AND 逻辑
    And,
    /// OR 逻辑
    Or,
    /// NOR 逻辑
    Nor,
}

impl LogicalOperator {
    /// 从 `$and` / `$or` / `$nor` 解析
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "$and" => Some(LogicalOperator::And),
            "$or" => Some(LogicalOperator::Or),
            "$nor" => Some(LogicalOperator::Nor),
            _ => None,
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// 升序
    Asc,
    /// 降序
    Desc,
}

impl SortDirection {
    /// Mongo 风格的数值表示
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// 查找选项：分页与排序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// 返回数量上限（None 表示不限）
    pub limit: Option<u64>,
    /// 跳过的记录数
    pub offset: u64,
    /// 排序字段（点分路径访问嵌套值）
    pub order_by: Option<String>,
    /// 是否降序
    pub reverse: bool,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置返回数量上限
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 设置跳过的记录数
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// 设置排序字段
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// 设置是否降序
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// 排序方向
    pub fn direction(&self) -> SortDirection {
        if self.reverse {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// 去掉分页与排序后的选项，用于内存排序前的全量查询
    pub(crate) fn unpaginated(&self) -> Self {
        Self::default()
    }
}

/// 索引字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    /// 字段名
    pub field: String,
    /// 排序方向
    pub direction: SortDirection,
}

impl IndexField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// 索引选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// 索引名称（None 时由后端生成）
    pub name: Option<String>,
    /// 是否唯一索引
    pub unique: bool,
    /// 是否稀疏索引
    pub sparse: bool,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_operators() {
        assert_eq!(QueryOperator::parse("$gte").unwrap(), QueryOperator::Gte);
        assert_eq!(QueryOperator::parse("$nin").unwrap(), QueryOperator::NotIn);
        assert!(QueryOperator::parse("$where").is_err());
        assert_eq!(LogicalOperator::parse("$or"), Some(LogicalOperator::Or));
        assert_eq!(LogicalOperator::parse("name"), None);
    }

    #[test]
    fn find_options_builder() {
        let options = FindOptions::new().limit(10).offset(5).order_by("meta.age").reverse(true);
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.offset, 5);
        assert_eq!(options.direction(), SortDirection::Desc);
        assert_eq!(options.unpaginated(), FindOptions::default());
    }
}
