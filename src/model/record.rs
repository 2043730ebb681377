//! 记录实例
//!
//! 记录按 `New → Persisted → Deleted` 单向流转。保存前依次校验、后处理并
//! 生成文档；后端失败时字段值恢复为调用前的状态。

use crate::error::{SchemaError, SchemaResult};
use crate::model::schema::Schema;
use crate::types::*;
use rat_logger::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// 记录的持久化状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// 尚未写入存储
    New,
    /// 已写入存储
    Persisted,
    /// 已从存储删除
    Deleted,
}

/// 某个记录结构的一条记录
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    id: Option<IdType>,
    values: Document,
    state: RecordState,
    /// 上次后处理（或从存储读取）后的字段值
    processed: HashMap<String, DataValue>,
}

impl Record {
    /// 创建新记录：默认值 < 覆盖值
    pub fn new(schema: Arc<Schema>, overrides: Document) -> Self {
        Self::from_document(schema, overrides, Document::new())
    }

    /// 从存储文档重建记录：默认值 < 覆盖值 < 存储文档
    ///
    /// 存储文档带 `_id` 时记录直接处于 `Persisted` 状态
    pub fn from_document(schema: Arc<Schema>, mut overrides: Document, mut stored: Document) -> Self {
        if overrides.remove(ID_FIELD).is_some() {
            warn!("覆盖值中的 {} 被忽略，标识符只能来自存储文档", ID_FIELD);
        }

        let mut values = Document::with_capacity(schema.fields().len());
        for (name, field) in schema.fields() {
            values.insert(name.clone(), field.default_value().clone());
        }
        values.extend(overrides);

        let id = stored.remove(ID_FIELD).and_then(|value| id_from_value(&value));

        // 只有从存储读取的值视为已处理，覆盖值仍需后处理
        let processed: HashMap<String, DataValue> = match &id {
            Some(_) => schema
                .fields()
                .iter()
                .filter(|(_, field)| field.has_post_processors())
                .filter_map(|(name, _)| stored.get(name).map(|v| (name.clone(), v.clone())))
                .collect(),
            None => HashMap::new(),
        };
        values.extend(stored);

        let state = if id.is_some() {
            RecordState::Persisted
        } else {
            RecordState::New
        };

        Self {
            schema,
            id,
            values,
            state,
            processed,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn id(&self) -> Option<&IdType> {
        self.id.as_ref()
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    /// 读取字段值
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.values.get(name)
    }

    /// 设置字段值
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<DataValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn values(&self) -> &Document {
        &self.values
    }

    fn value_of(&self, name: &str) -> &DataValue {
        self.values.get(name).unwrap_or(&DataValue::Null)
    }

    /// 按声明顺序校验，返回第一个失败的字段
    pub fn validate(&self) -> SchemaResult<()> {
        for (name, field) in self.schema.fields() {
            field.validate_with_field_name(self.value_of(name), name)?;
        }
        Ok(())
    }

    /// 收集所有校验失败的字段，顺序与声明一致
    pub fn validation_errors(&self) -> Vec<SchemaError> {
        self.schema
            .fields()
            .iter()
            .filter_map(|(name, field)| field.validate_with_field_name(self.value_of(name), name).err())
            .collect()
    }

    /// 执行字段后处理并写回
    ///
    /// 已处理过的值不会再次处理；缺失的值按 null 处理
    pub fn post_process(&mut self) {
        for (name, field) in self.schema.fields() {
            if !field.has_post_processors() {
                continue;
            }
            let current = self.value_of(name).clone();
            if self.processed.get(name) == Some(&current) {
                continue;
            }

            let output = field.process(current);
            debug!("字段后处理: {}", name);
            self.values.insert(name.clone(), output.clone());
            self.processed.insert(name.clone(), output);
        }
    }

    /// 生成存储文档：只包含声明的字段，处于 `Persisted` 状态时带 `_id`
    pub fn to_document(&self) -> Document {
        let mut document = Document::with_capacity(self.schema.fields().len() + 1);
        for (name, _) in self.schema.fields() {
            document.insert(name.clone(), self.value_of(name).clone());
        }
        if self.state == RecordState::Persisted {
            if let Some(id) = &self.id {
                document.insert(ID_FIELD.to_string(), DataValue::Id(SchemaId::Single(id.clone())));
            }
        }
        document
    }

    /// 保存记录，返回标识符
    ///
    /// 新记录插入并采用后端返回的标识符，已持久化的记录整体更新
    pub async fn save(&mut self) -> SchemaResult<IdType> {
        if self.state == RecordState::Deleted {
            return Err(crate::schema_error!(state, crate::i18n::t("error.record_deleted")));
        }
        self.validate()?;

        let saved_values = self.values.clone();
        let saved_processed = self.processed.clone();
        self.post_process();
        let document = self.to_document();

        match self.persist(&document).await {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!("保存记录失败，恢复字段值: {}", e);
                self.values = saved_values;
                self.processed = saved_processed;
                Err(e)
            }
        }
    }

    async fn persist(&mut self, document: &Document) -> SchemaResult<IdType> {
        let mut session = self.schema.database().session().await?;
        let mut collection = session.collection(self.schema.collection())?;

        match (&self.state, &self.id) {
            (RecordState::Persisted, Some(id)) => {
                let id = id.clone();
                collection.update(document).await?.ok_or_else(|| {
                    crate::schema_error!(query, format!("记录在存储中不存在: {}", id))
                })?;
                debug!("更新记录: {}.{}", self.schema.collection(), id);
                Ok(id)
            }
            _ => {
                let stored = collection.insert(document).await?.ok_or_else(|| {
                    crate::schema_error!(query, "插入未返回文档")
                })?;
                let id = stored
                    .get(ID_FIELD)
                    .and_then(id_from_value)
                    .ok_or_else(|| crate::schema_error!(query, "插入结果缺少标识符"))?;

                info!("插入记录: {}.{}", self.schema.collection(), id);
                self.id = Some(id.clone());
                self.state = RecordState::Persisted;
                Ok(id)
            }
        }
    }

    /// 删除记录，返回后端是否删除了文档
    ///
    /// 未持久化的记录直接返回 `false`
    pub async fn delete(&mut self) -> SchemaResult<bool> {
        let id = match (&self.state, &self.id) {
            (RecordState::Persisted, Some(id)) => id.clone(),
            _ => return Ok(false),
        };

        let mut query = Document::with_capacity(1);
        query.insert(ID_FIELD.to_string(), DataValue::Id(SchemaId::Single(id.clone())));

        let mut session = self.schema.database().session().await?;
        let deleted = session
            .collection(self.schema.collection())?
            .delete(&query)
            .await?;

        info!("删除记录: {}.{} -> {}", self.schema.collection(), id, deleted);
        self.state = RecordState::Deleted;
        Ok(deleted)
    }
}

/// 从文档中的 `_id` 值提取标识符
fn id_from_value(value: &DataValue) -> Option<IdType> {
    match value {
        DataValue::Id(SchemaId::Single(id)) => Some(id.clone()),
        DataValue::Int(n) => Some(IdType::Number(*n)),
        DataValue::String(s) => Some(IdType::String(s.clone())),
        DataValue::ObjectId(oid) => Some(IdType::String(oid.to_hex())),
        _ => None,
    }
}

#[cfg(all(test, feature = "sqlite-support"))]
mod tests {
    use super::*;
    use crate::config::memory_config;
    use crate::document;
    use crate::manager::DatabaseHandler;
    use crate::model::convenience::{number_field, password_field, string_field};

    async fn schema() -> Arc<Schema> {
        let db = DatabaseHandler::connect(memory_config()).await.unwrap();
        Schema::builder("accounts")
            .field("name", string_field().build().unwrap())
            .field("age", number_field().required(false).default(18).build().unwrap())
            .field(
                "secret",
                password_field(|v| DataValue::String(format!("h({})", v.as_str().unwrap_or(""))))
                    .build()
                    .unwrap(),
            )
            .database(db)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn precedence_defaults_overrides_stored() {
        let schema = schema().await;

        let record = schema.create(document! { "name" => "a" });
        assert_eq!(record.get("age"), Some(&DataValue::Int(18)));
        assert_eq!(record.state(), RecordState::New);

        let record = Record::from_document(
            Arc::clone(&schema),
            document! { "name" => "override", "age" => 20 },
            document! { "_id" => 7, "name" => "stored" },
        );
        assert_eq!(record.get("name"), Some(&DataValue::from("stored")));
        assert_eq!(record.get("age"), Some(&DataValue::Int(20)));
        assert_eq!(record.id(), Some(&IdType::Number(7)));
        assert_eq!(record.state(), RecordState::Persisted);
    }

    #[tokio::test]
    async fn validation_reports_first_failure_in_order() {
        let schema = schema().await;
        let record = schema.create(document! { "age" => "old" });

        match record.validate().unwrap_err() {
            SchemaError::ValidationError { field, .. } => assert_eq!(field, "name"),
            other => panic!("unexpected error: {other:?}"),
        }
        let fields: Vec<String> = record
            .validation_errors()
            .into_iter()
            .filter_map(|e| e.field().map(str::to_string))
            .collect();
        assert_eq!(fields, vec!["name", "age", "secret"]);
    }

    #[tokio::test]
    async fn post_process_runs_once_per_value() {
        let schema = schema().await;
        let mut record = schema.create(document! { "name" => "a", "secret" => "hunter2" });

        record.post_process();
        record.post_process();
        assert_eq!(record.get("secret"), Some(&DataValue::from("h(hunter2)")));

        record.set("secret", "changed");
        record.post_process();
        assert_eq!(record.get("secret"), Some(&DataValue::from("h(changed)")));
    }

    #[tokio::test]
    async fn overrides_on_loaded_records_are_processed() {
        let schema = schema().await;
        let mut record = Record::from_document(
            Arc::clone(&schema),
            document! { "secret" => "plain" },
            document! { "_id" => 1, "name" => "x" },
        );
        assert_eq!(record.state(), RecordState::Persisted);

        record.post_process();
        assert_eq!(record.get("secret"), Some(&DataValue::from("h(plain)")));

        let mut loaded = Record::from_document(
            Arc::clone(&schema),
            document! {},
            document! { "_id" => 2, "name" => "y", "secret" => "h(stored)" },
        );
        loaded.post_process();
        assert_eq!(loaded.get("secret"), Some(&DataValue::from("h(stored)")));
    }

    #[tokio::test]
    async fn null_values_reach_post_processors_once() {
        let db = DatabaseHandler::connect(memory_config()).await.unwrap();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = Schema::builder("tokens")
            .field(
                "token",
                string_field()
                    .required(false)
                    .post_processor(move |v| {
                        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        if v.is_null() {
                            DataValue::from("generated")
                        } else {
                            v
                        }
                    })
                    .build()
                    .unwrap(),
            )
            .database(db)
            .build()
            .unwrap();

        let mut record = schema.create(document! {});
        record.post_process();
        record.post_process();
        assert_eq!(record.get("token"), Some(&DataValue::from("generated")));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let mut missing = Record::from_document(Arc::clone(&schema), document! {}, document! { "_id" => 3 });
        missing.post_process();
        assert_eq!(missing.get("token"), Some(&DataValue::from("generated")));
    }

    #[tokio::test]
    async fn to_document_holds_declared_fields_only() {
        let schema = schema().await;
        let record = schema.create(document! { "name" => "a", "extra" => 1 });
        let document = record.to_document();

        assert_eq!(document.len(), 3);
        assert_eq!(document["secret"], DataValue::Null);
        assert!(!document.contains_key("extra"));
        assert!(!document.contains_key(ID_FIELD));
    }

    #[tokio::test]
    async fn deleted_records_cannot_be_saved() {
        let schema = schema().await;
        let mut record = schema.create(document! { "name" => "a", "secret" => "hunter2" });

        assert!(!record.delete().await.unwrap());
        record.save().await.unwrap();
        assert!(record.delete().await.unwrap());
        assert_eq!(record.state(), RecordState::Deleted);
        assert!(record.id().is_some());
        assert!(!record.to_document().contains_key(ID_FIELD));

        let err = record.save().await.unwrap_err();
        assert!(matches!(err, SchemaError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn failed_save_restores_values() {
        let schema = schema().await;
        let mut record = schema.create(document! { "name" => "a", "secret" => "hunter2" });
        schema.database().close().await;

        assert!(record.save().await.is_err());
        assert_eq!(record.get("secret"), Some(&DataValue::from("hunter2")));
        assert_eq!(record.state(), RecordState::New);
    }
}
