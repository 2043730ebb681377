//! SQLite文档匹配模块
//!
//! 嵌入式存储在内存中执行 Mongo 风格的查询：字段按点分路径取值，
//! 数组字段的相等判断匹配任意元素。

use crate::error::SchemaResult;
use crate::types::*;
use regex::RegexBuilder;
use std::cmp::Ordering;

/// 判断文档是否满足查询
pub(crate) fn matches(document: &Document, query: &Document) -> SchemaResult<bool> {
    for (key, condition) in query {
        let matched = if key.starts_with('$') {
            match_logical(document, key, condition)?
        } else {
            match_field(document_path(document, key), condition)?
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// 查询是否只按 `_id` 等值匹配，用于主键快速路径
pub(crate) fn id_lookup(query: &Document) -> Option<i64> {
    if query.len() != 1 {
        return None;
    }
    match query.get(ID_FIELD)? {
        DataValue::Int(id) => Some(*id),
        _ => None,
    }
}

fn match_logical(document: &Document, key: &str, condition: &DataValue) -> SchemaResult<bool> {
    let operator = LogicalOperator::parse(key).ok_or_else(|| {
        crate::schema_error!(query, format!("不支持的查询操作符: {}", key))
    })?;
    let clauses = condition.as_array().ok_or_else(|| {
        crate::schema_error!(query, format!("{} 的参数必须是查询列表", key))
    })?;

    let mut results = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let clause = clause.as_object().ok_or_else(|| {
            crate::schema_error!(query, format!("{} 的子句必须是映射", key))
        })?;
        results.push(matches(document, clause)?);
    }

    Ok(match operator {
        LogicalOperator::And => results.iter().all(|r| *r),
        LogicalOperator::Or => results.iter().any(|r| *r),
        LogicalOperator::Nor => !results.iter().any(|r| *r),
    })
}

fn is_operator_expression(condition: &DataValue) -> bool {
    match condition {
        DataValue::Object(map) => !map.is_empty() && map.keys().all(|k| k.starts_with('$')),
        _ => false,
    }
}

fn match_field(value: Option<&DataValue>, condition: &DataValue) -> SchemaResult<bool> {
    match condition {
        DataValue::Object(operators) if is_operator_expression(condition) => {
            match_operators(value, operators)
        }
        literal => Ok(equals(value, literal)),
    }
}

fn match_operators(value: Option<&DataValue>, operators: &Document) -> SchemaResult<bool> {
    for (key, argument) in operators {
        // 由 $regex 一并处理
        if key == "$options" {
            continue;
        }
        let matched = match QueryOperator::parse(key)? {
            QueryOperator::Eq => equals(value, argument),
            QueryOperator::Ne => !equals(value, argument),
            QueryOperator::Gt => compare(value, argument, |o| o == Ordering::Greater),
            QueryOperator::Gte => compare(value, argument, |o| o != Ordering::Less),
            QueryOperator::Lt => compare(value, argument, |o| o == Ordering::Less),
            QueryOperator::Lte => compare(value, argument, |o| o != Ordering::Greater),
            QueryOperator::In => member_of(value, argument, key)?,
            QueryOperator::NotIn => !member_of(value, argument, key)?,
            QueryOperator::Exists => value.is_some() == truthy(argument),
            QueryOperator::Regex => regex_match(value, argument, operators.get("$options"))?,
            QueryOperator::Not => match argument {
                DataValue::Object(inner) if is_operator_expression(argument) => {
                    !match_operators(value, inner)?
                }
                _ => {
                    return Err(crate::schema_error!(query, "$not 的参数必须是操作符表达式"));
                }
            },
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// 相等匹配：null 匹配缺失字段，数组匹配任一元素
fn equals(value: Option<&DataValue>, expected: &DataValue) -> bool {
    match value {
        None => expected.is_null(),
        Some(actual) => {
            actual.loose_eq(expected)
                || matches!(actual, DataValue::Array(items) if items.iter().any(|item| item.loose_eq(expected)))
        }
    }
}

fn compare<F>(value: Option<&DataValue>, bound: &DataValue, accept: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    let Some(actual) = value else {
        return false;
    };
    let check = |candidate: &DataValue| candidate.partial_compare(bound).is_some_and(&accept);
    match actual {
        DataValue::Array(items) if !matches!(bound, DataValue::Array(_)) => items.iter().any(check),
        other => check(other),
    }
}

fn member_of(value: Option<&DataValue>, argument: &DataValue, operator: &str) -> SchemaResult<bool> {
    let candidates = argument.as_array().ok_or_else(|| {
        crate::schema_error!(query, format!("{} 的参数必须是列表", operator))
    })?;
    Ok(candidates.iter().any(|candidate| equals(value, candidate)))
}

fn truthy(value: &DataValue) -> bool {
    match value {
        DataValue::Null => false,
        DataValue::Bool(b) => *b,
        other => other.as_f64().map_or(true, |n| n != 0.0),
    }
}

fn regex_match(
    value: Option<&DataValue>,
    pattern: &DataValue,
    options: Option<&DataValue>,
) -> SchemaResult<bool> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| crate::schema_error!(query, "$regex 的参数必须是字符串"))?;
    let flags = options.and_then(|o| o.as_str()).unwrap_or("");

    let regex = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|e| {
            crate::schema_error!(
                query,
                crate::i18n::tf(
                    "error.invalid_regexp",
                    &[("pattern", pattern), ("message", &e.to_string())]
                )
            )
        })?;

    Ok(match value {
        Some(DataValue::String(s)) => regex.is_match(s),
        Some(DataValue::Array(items)) => items
            .iter()
            .any(|item| item.as_str().is_some_and(|s| regex.is_match(s))),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    fn sample() -> Document {
        document! {
            "_id" => 1,
            "name" => "Alice",
            "age" => 30,
            "tags" => vec!["admin", "staff"],
            "profile" => document! { "city" => "Paris", "score" => 9.5 },
        }
    }

    fn check(query: Document) -> bool {
        matches(&sample(), &query).unwrap()
    }

    #[test]
    fn equality_and_dot_paths() {
        assert!(check(document! { "name" => "Alice" }));
        assert!(check(document! { "profile.city" => "Paris" }));
        assert!(check(document! { "age" => 30.0 }));
        assert!(!check(document! { "name" => "Bob" }));
        assert!(check(document! { "missing" => DataValue::Null }));
        assert!(check(document! {}));
    }

    #[test]
    fn array_fields_match_any_element() {
        assert!(check(document! { "tags" => "staff" }));
        assert!(check(document! { "tags" => vec!["admin", "staff"] }));
        assert!(!check(document! { "tags" => "guest" }));
    }

    #[test]
    fn comparison_operators() {
        assert!(check(document! { "age" => document! { "$gt" => 18, "$lte" => 30 } }));
        assert!(!check(document! { "age" => document! { "$lt" => 30 } }));
        assert!(check(document! { "profile.score" => document! { "$gte" => 9 } }));
        // 类别不同的值不参与比较
        assert!(!check(document! { "name" => document! { "$gt" => 1 } }));
        assert!(!check(document! { "missing" => document! { "$gt" => 1 } }));
    }

    #[test]
    fn membership_and_existence() {
        assert!(check(document! { "name" => document! { "$in" => vec!["Bob", "Alice"] } }));
        assert!(check(document! { "tags" => document! { "$nin" => vec!["guest"] } }));
        assert!(check(document! { "age" => document! { "$ne" => 31 } }));
        assert!(check(document! { "missing" => document! { "$exists" => false } }));
        assert!(check(document! { "profile" => document! { "$exists" => true } }));
    }

    #[test]
    fn regex_with_options() {
        assert!(check(document! { "name" => document! { "$regex" => "^ali", "$options" => "i" } }));
        assert!(!check(document! { "name" => document! { "$regex" => "^ali" } }));
        assert!(check(document! { "tags" => document! { "$regex" => "^st" } }));
    }

    #[test]
    fn logical_operators() {
        assert!(check(document! {
            "$or" => vec![
                DataValue::from(document! { "name" => "Bob" }),
                DataValue::from(document! { "age" => 30 }),
            ]
        }));
        assert!(!check(document! {
            "$and" => vec![
                DataValue::from(document! { "name" => "Alice" }),
                DataValue::from(document! { "age" => 31 }),
            ]
        }));
        assert!(check(document! {
            "$nor" => vec![DataValue::from(document! { "name" => "Bob" })]
        }));
        assert!(check(document! { "age" => document! { "$not" => document! { "$gt" => 40 } } }));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        assert!(matches(&sample(), &document! { "age" => document! { "$near" => 1 } }).is_err());
        assert!(matches(&sample(), &document! { "$where" => "1" }).is_err());
        assert!(matches(&sample(), &document! { "age" => document! { "$in" => 3 } }).is_err());
    }

    #[test]
    fn id_lookup_only_for_plain_id_queries() {
        assert_eq!(id_lookup(&document! { "_id" => 4 }), Some(4));
        assert_eq!(id_lookup(&document! { "_id" => 4, "name" => "x" }), None);
        assert_eq!(id_lookup(&document! { "_id" => document! { "$in" => vec![4i64] } }), None);
    }
}
