//! 记录结构声明
//!
//! `Schema` 保存集合名、按声明顺序排列的字段定义以及数据库处理器，
//! 同时提供集合级别的查询和维护操作。

use crate::error::SchemaResult;
use crate::manager::DatabaseHandler;
use crate::model::field_types::FieldDefinition;
use crate::model::record::Record;
use crate::security::{validate_collection_name, SecurityValidator};
use crate::types::*;
use rat_logger::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

/// 记录结构声明
#[derive(Debug)]
pub struct Schema {
    collection: String,
    fields: Vec<(String, FieldDefinition)>,
    database: Arc<DatabaseHandler>,
}

/// 记录结构构建器
#[derive(Debug)]
pub struct SchemaBuilder {
    collection: String,
    fields: Vec<(String, FieldDefinition)>,
    database: Option<Arc<DatabaseHandler>>,
}

impl SchemaBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            fields: Vec::new(),
            database: None,
        }
    }

    /// 追加一个字段
    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.push((name.into(), definition));
        self
    }

    /// 追加一组字段，保持给定顺序
    pub fn fields(mut self, fields: Vec<(String, FieldDefinition)>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// 设置数据库处理器
    pub fn database(mut self, database: Arc<DatabaseHandler>) -> Self {
        self.database = Some(database);
        self
    }

    /// 构建记录结构
    ///
    /// # 错误
    ///
    /// 未设置数据库、集合名非法、字段名重复或使用保留名时返回 `ConfigError`
    pub fn build(self) -> SchemaResult<Arc<Schema>> {
        let database = self
            .database
            .ok_or_else(|| crate::schema_error!(config, "必须设置数据库处理器"))?;

        validate_collection_name(database.backend_type(), &self.collection)?;

        let mut seen = HashSet::new();
        for (name, _) in &self.fields {
            SecurityValidator::validate_field_name(name)?;
            if !seen.insert(name.as_str()) {
                return Err(crate::schema_error!(
                    config,
                    crate::i18n::tf("error.field_name_duplicate", &[("name", name)])
                ));
            }
        }

        info!(
            "声明记录结构: 集合={}, 字段数={}",
            self.collection,
            self.fields.len()
        );
        Ok(Arc::new(Schema {
            collection: self.collection,
            fields: self.fields,
            database,
        }))
    }
}

impl Schema {
    /// 创建记录结构构建器
    pub fn builder(collection: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(collection)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// 按声明顺序排列的字段
    pub fn fields(&self) -> &[(String, FieldDefinition)] {
        &self.fields
    }

    /// 按名称查找字段定义
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, definition)| definition)
    }

    pub fn database(&self) -> &Arc<DatabaseHandler> {
        &self.database
    }

    /// 创建新记录：先填默认值，再应用覆盖值
    pub fn create(self: &Arc<Self>, overrides: Document) -> Record {
        Record::new(Arc::clone(self), overrides)
    }

    /// 查询记录
    ///
    /// 支持 limit、offset、点分路径排序与倒序
    pub async fn find(self: &Arc<Self>, query: Document, options: FindOptions) -> SchemaResult<Vec<Record>> {
        debug!("查询集合 {}: {:?}, {:?}", self.collection, query, options);
        let mut session = self.database.session().await?;
        let documents = session
            .collection(&self.collection)?
            .find(&query, &options)
            .await?;

        Ok(documents
            .into_iter()
            .map(|document| Record::from_document(Arc::clone(self), Document::new(), document))
            .collect())
    }

    /// 查询第一条匹配的记录
    pub async fn find_one(self: &Arc<Self>, query: Document) -> SchemaResult<Option<Record>> {
        let mut session = self.database.session().await?;
        let document = session.collection(&self.collection)?.find_one(&query).await?;
        Ok(document.map(|document| Record::from_document(Arc::clone(self), Document::new(), document)))
    }

    /// 按标识符查询记录
    pub async fn find_by_id(self: &Arc<Self>, id: impl Into<IdType>) -> SchemaResult<Option<Record>> {
        let mut query = Document::with_capacity(1);
        query.insert(ID_FIELD.to_string(), DataValue::from(SchemaId::single(id)));
        self.find_one(query).await
    }

    /// 字段的去重取值
    pub async fn distinct(&self, field: &str) -> SchemaResult<Vec<DataValue>> {
        let mut session = self.database.session().await?;
        session.collection(&self.collection)?.distinct(field).await
    }

    /// 统计匹配记录数
    pub async fn count(&self, query: Document) -> SchemaResult<u64> {
        let mut session = self.database.session().await?;
        session.collection(&self.collection)?.count(&query).await
    }

    /// 删除整个集合
    pub async fn drop_collection(&self) -> SchemaResult<bool> {
        let mut session = self.database.session().await?;
        session.drop_collection(&self.collection).await
    }

    /// 创建索引，返回索引名
    pub async fn create_index(&self, fields: &[IndexField], options: IndexOptions) -> SchemaResult<String> {
        let mut session = self.database.session().await?;
        session
            .collection(&self.collection)?
            .create_index(fields, &options)
            .await
    }

    /// 删除索引
    pub async fn drop_index(&self, name: &str) -> SchemaResult<()> {
        let mut session = self.database.session().await?;
        session.collection(&self.collection)?.drop_index(name).await
    }
}
