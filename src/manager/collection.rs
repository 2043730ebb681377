//! 集合句柄
//!
//! 出站的查询和文档先经过规范化，入站结果再还原为规范标识符。
//! 后端不支持原生排序时在内存中稳定排序并分页。

use crate::error::SchemaResult;
use crate::manager::DatabaseSession;
use crate::normalizer::{denormalize, normalize};
use crate::types::*;
use rat_logger::debug;

/// 会话内某个集合的操作句柄
pub struct CollectionHandle<'a> {
    session: &'a mut DatabaseSession,
    name: String,
}

impl<'a> CollectionHandle<'a> {
    pub(crate) fn new(session: &'a mut DatabaseSession, name: String) -> Self {
        Self { session, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 查询文档
    pub async fn find(&mut self, query: &Document, options: &FindOptions) -> SchemaResult<Vec<Document>> {
        let (handler, connection) = self.session.parts();
        let adapter = handler.adapter();
        let codec = adapter.identifier_codec();
        let native_query = normalize(query, codec)?;

        let documents = if options.order_by.is_some() && !adapter.supports_native_ordering() {
            debug!("后端不支持原生排序，在内存中排序: {}", self.name);
            let all = adapter
                .find(connection, &self.name, &native_query, &options.unpaginated())
                .await?;
            sort_and_paginate(all, options)
        } else {
            adapter
                .find(connection, &self.name, &native_query, options)
                .await?
        };

        Ok(documents
            .into_iter()
            .map(|document| denormalize(document, codec))
            .collect())
    }

    /// 查询第一条匹配的文档
    pub async fn find_one(&mut self, query: &Document) -> SchemaResult<Option<Document>> {
        let documents = self.find(query, &FindOptions::new().limit(1)).await?;
        Ok(documents.into_iter().next())
    }

    /// 插入文档，返回带规范 `_id` 的文档
    pub async fn insert(&mut self, document: &Document) -> SchemaResult<Option<Document>> {
        let (handler, connection) = self.session.parts();
        let adapter = handler.adapter();
        let codec = adapter.identifier_codec();
        let native = normalize(document, codec)?;
        let stored = adapter.insert(connection, &self.name, &native).await?;
        Ok(stored.map(|document| denormalize(document, codec)))
    }

    /// 按 `_id` 替换文档，未匹配时返回 `None`
    pub async fn update(&mut self, document: &Document) -> SchemaResult<Option<Document>> {
        let (handler, connection) = self.session.parts();
        let adapter = handler.adapter();
        let codec = adapter.identifier_codec();
        let native = normalize(document, codec)?;
        let stored = adapter.update(connection, &self.name, &native).await?;
        Ok(stored.map(|document| denormalize(document, codec)))
    }

    /// 删除一条匹配的文档
    pub async fn delete(&mut self, query: &Document) -> SchemaResult<bool> {
        let (handler, connection) = self.session.parts();
        let adapter = handler.adapter();
        let native = normalize(query, adapter.identifier_codec())?;
        adapter.delete(connection, &self.name, &native).await
    }

    /// 字段的去重取值
    pub async fn distinct(&mut self, field: &str) -> SchemaResult<Vec<DataValue>> {
        let (handler, connection) = self.session.parts();
        let adapter = handler.adapter();
        let codec = adapter.identifier_codec();
        let values = adapter.distinct(connection, &self.name, field).await?;

        // 复用文档级还原，`_id` 字段的取值也能还原为规范标识符
        Ok(values
            .into_iter()
            .map(|value| {
                let mut wrapper = Document::with_capacity(1);
                wrapper.insert(field.to_string(), value);
                denormalize(wrapper, codec)
                    .remove(field)
                    .unwrap_or(DataValue::Null)
            })
            .collect())
    }

    /// 统计匹配文档数
    pub async fn count(&mut self, query: &Document) -> SchemaResult<u64> {
        let (handler, connection) = self.session.parts();
        let adapter = handler.adapter();
        let native = normalize(query, adapter.identifier_codec())?;
        adapter.count(connection, &self.name, &native).await
    }

    /// 创建索引
    pub async fn create_index(&mut self, fields: &[IndexField], options: &IndexOptions) -> SchemaResult<String> {
        let (handler, connection) = self.session.parts();
        handler
            .adapter()
            .create_index(connection, &self.name, fields, options)
            .await
    }

    /// 删除索引
    pub async fn drop_index(&mut self, name: &str) -> SchemaResult<()> {
        let (handler, connection) = self.session.parts();
        handler.adapter().drop_index(connection, &self.name, name).await
    }
}

/// 按排序字段稳定排序后应用 offset/limit
///
/// 缺失的排序值视为 null，排在最前；`reverse` 只翻转比较结果
pub(crate) fn sort_and_paginate(mut documents: Vec<Document>, options: &FindOptions) -> Vec<Document> {
    if let Some(field) = &options.order_by {
        documents.sort_by(|a, b| {
            let left = document_path(a, field).unwrap_or(&DataValue::Null);
            let right = document_path(b, field).unwrap_or(&DataValue::Null);
            let ordering = left.sort_cmp(right);
            if options.reverse {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    let offset = usize::try_from(options.offset).unwrap_or(usize::MAX);
    let iter = documents.into_iter().skip(offset);
    match options.limit.filter(|limit| *limit > 0) {
        Some(limit) => iter.take(usize::try_from(limit).unwrap_or(usize::MAX)).collect(),
        None => iter.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    fn people() -> Vec<Document> {
        vec![
            document! { "name" => "c", "meta" => document! { "age" => 30 } },
            document! { "name" => "a", "meta" => document! { "age" => 20 } },
            document! { "name" => "b" },
            document! { "name" => "d", "meta" => document! { "age" => 20 } },
        ]
    }

    fn names(documents: &[Document]) -> Vec<&str> {
        documents
            .iter()
            .filter_map(|doc| doc.get("name").and_then(|v| v.as_str()))
            .collect()
    }

    #[test]
    fn sorts_by_nested_path_with_missing_first() {
        let sorted = sort_and_paginate(people(), &FindOptions::new().order_by("meta.age"));
        assert_eq!(names(&sorted), vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn reverse_keeps_ties_in_original_order() {
        let sorted = sort_and_paginate(
            people(),
            &FindOptions::new().order_by("meta.age").reverse(true),
        );
        assert_eq!(names(&sorted), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn offset_and_limit_apply_after_sorting() {
        let options = FindOptions::new().order_by("name").offset(1).limit(2);
        let page = sort_and_paginate(people(), &options);
        assert_eq!(names(&page), vec!["b", "c"]);

        let past_end = sort_and_paginate(people(), &FindOptions::new().order_by("name").offset(10));
        assert!(past_end.is_empty());
    }
}
