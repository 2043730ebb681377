//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        // 数据库连接错误
        let mut connection_errors = HashMap::new();
        connection_errors.insert("zh-CN".to_string(), "数据库连接失败: {message}".to_string());
        connection_errors.insert("en-US".to_string(), "Database connection failed: {message}".to_string());
        connection_errors.insert("ja-JP".to_string(), "データベース接続に失敗しました: {message}".to_string());
        translations.insert("error.connection".to_string(), connection_errors);

        // 查询错误
        let mut query_errors = HashMap::new();
        query_errors.insert("zh-CN".to_string(), "查询执行失败: {message}".to_string());
        query_errors.insert("en-US".to_string(), "Query execution failed: {message}".to_string());
        query_errors.insert("ja-JP".to_string(), "クエリ実行が失敗しました: {message}".to_string());
        translations.insert("error.query".to_string(), query_errors);

        // 字段校验错误
        let mut validation_errors = HashMap::new();
        validation_errors.insert("zh-CN".to_string(), "字段 \"{field}\" 的值 \"{value}\" 校验失败".to_string());
        validation_errors.insert("en-US".to_string(), "Value \"{value}\" for field \"{field}\" is invalid".to_string());
        validation_errors.insert("ja-JP".to_string(), "フィールド \"{field}\" の値 \"{value}\" は無効です".to_string());
        translations.insert("error.validation".to_string(), validation_errors);

        // 配置错误
        let mut config_errors = HashMap::new();
        config_errors.insert("zh-CN".to_string(), "配置错误: {message}".to_string());
        config_errors.insert("en-US".to_string(), "Configuration error: {message}".to_string());
        config_errors.insert("ja-JP".to_string(), "設定エラー: {message}".to_string());
        translations.insert("error.config".to_string(), config_errors);

        // 不支持的数据库类型
        let mut unsupported_db_errors = HashMap::new();
        unsupported_db_errors.insert("zh-CN".to_string(), "不支持的数据库类型: {db_type}".to_string());
        unsupported_db_errors.insert("en-US".to_string(), "Unsupported database type: {db_type}".to_string());
        unsupported_db_errors.insert("ja-JP".to_string(), "サポートされていないデータベースタイプ: {db_type}".to_string());
        translations.insert("error.unsupported_database".to_string(), unsupported_db_errors);

        // 后端不支持的操作
        let mut unsupported_operation = HashMap::new();
        unsupported_operation.insert("zh-CN".to_string(), "后端 {backend} 不支持操作: {operation}".to_string());
        unsupported_operation.insert("en-US".to_string(), "Backend {backend} does not support operation: {operation}".to_string());
        unsupported_operation.insert("ja-JP".to_string(), "バックエンド {backend} は操作をサポートしていません: {operation}".to_string());
        translations.insert("error.unsupported_operation".to_string(), unsupported_operation);

        // 无效标识符
        let mut invalid_identifier = HashMap::new();
        invalid_identifier.insert("zh-CN".to_string(), "无效的标识符 \"{value}\" (后端: {backend})".to_string());
        invalid_identifier.insert("en-US".to_string(), "Invalid identifier \"{value}\" (backend: {backend})".to_string());
        invalid_identifier.insert("ja-JP".to_string(), "無効な識別子 \"{value}\" (バックエンド: {backend})".to_string());
        translations.insert("error.invalid_identifier".to_string(), invalid_identifier);

        // 密码字段缺少哈希函数
        let mut password_func_missing = HashMap::new();
        password_func_missing.insert("zh-CN".to_string(), "密码字段必须提供 password_func".to_string());
        password_func_missing.insert("en-US".to_string(), "Password field requires a password_func".to_string());
        password_func_missing.insert("ja-JP".to_string(), "パスワードフィールドには password_func が必要です".to_string());
        translations.insert("error.password_func_missing".to_string(), password_func_missing);

        // 非法正则表达式
        let mut invalid_regexp = HashMap::new();
        invalid_regexp.insert("zh-CN".to_string(), "非法正则表达式 \"{pattern}\": {message}".to_string());
        invalid_regexp.insert("en-US".to_string(), "Invalid regular expression \"{pattern}\": {message}".to_string());
        invalid_regexp.insert("ja-JP".to_string(), "無効な正規表現 \"{pattern}\": {message}".to_string());
        translations.insert("error.invalid_regexp".to_string(), invalid_regexp);

        // 字段名重复
        let mut field_name_duplicate = HashMap::new();
        field_name_duplicate.insert("zh-CN".to_string(), "字段名 '{name}' 重复".to_string());
        field_name_duplicate.insert("en-US".to_string(), "Field name '{name}' is duplicated".to_string());
        field_name_duplicate.insert("ja-JP".to_string(), "フィールド名 '{name}' が重複しています".to_string());
        translations.insert("error.field_name_duplicate".to_string(), field_name_duplicate);

        // 保留字段名
        let mut field_name_reserved = HashMap::new();
        field_name_reserved.insert("zh-CN".to_string(), "字段名 '{name}' 为保留标识符键".to_string());
        field_name_reserved.insert("en-US".to_string(), "Field name '{name}' is the reserved identifier key".to_string());
        field_name_reserved.insert("ja-JP".to_string(), "フィールド名 '{name}' は予約済みの識別子キーです".to_string());
        translations.insert("error.field_name_reserved".to_string(), field_name_reserved);

        // 已删除记录不可保存
        let mut record_deleted = HashMap::new();
        record_deleted.insert("zh-CN".to_string(), "记录已删除，无法保存".to_string());
        record_deleted.insert("en-US".to_string(), "Record has been deleted and cannot be saved".to_string());
        record_deleted.insert("ja-JP".to_string(), "レコードは削除済みのため保存できません".to_string());
        translations.insert("error.record_deleted".to_string(), record_deleted);

        // 未编译的后端
        let mut backend_disabled = HashMap::new();
        backend_disabled.insert("zh-CN".to_string(), "{backend} 后端未启用，请开启特性 {feature}".to_string());
        backend_disabled.insert("en-US".to_string(), "{backend} backend is disabled, enable feature {feature}".to_string());
        backend_disabled.insert("ja-JP".to_string(), "{backend} バックエンドは無効です。機能 {feature} を有効にしてください".to_string());
        translations.insert("error.backend_disabled".to_string(), backend_disabled);

        // SQLite内存数据库连接失败
        let mut sqlite_memory_errors = HashMap::new();
        sqlite_memory_errors.insert("zh-CN".to_string(), "SQLite内存数据库连接失败: {message}".to_string());
        sqlite_memory_errors.insert("en-US".to_string(), "SQLite in-memory database connection failed: {message}".to_string());
        sqlite_memory_errors.insert("ja-JP".to_string(), "SQLiteインメモリデータベース接続失敗: {message}".to_string());
        translations.insert("error.sqlite_memory".to_string(), sqlite_memory_errors);

        // 创建SQLite数据库目录失败
        let mut sqlite_dir_create_failed = HashMap::new();
        sqlite_dir_create_failed.insert("zh-CN".to_string(), "创建SQLite数据库目录失败: {message}".to_string());
        sqlite_dir_create_failed.insert("en-US".to_string(), "Failed to create SQLite database directory: {message}".to_string());
        sqlite_dir_create_failed.insert("ja-JP".to_string(), "SQLiteデータベースディレクトリ作成失敗: {message}".to_string());
        translations.insert("error.sqlite_dir_create".to_string(), sqlite_dir_create_failed);

        // SQLite连接失败
        let mut sqlite_connection_failed = HashMap::new();
        sqlite_connection_failed.insert("zh-CN".to_string(), "SQLite连接失败: {message}".to_string());
        sqlite_connection_failed.insert("en-US".to_string(), "SQLite connection failed: {message}".to_string());
        sqlite_connection_failed.insert("ja-JP".to_string(), "SQLite接続失敗: {message}".to_string());
        translations.insert("error.sqlite_connection".to_string(), sqlite_connection_failed);

        // MongoDB连接失败
        let mut mongodb_connection_failed = HashMap::new();
        mongodb_connection_failed.insert("zh-CN".to_string(), "MongoDB连接失败: {message}".to_string());
        mongodb_connection_failed.insert("en-US".to_string(), "MongoDB connection failed: {message}".to_string());
        mongodb_connection_failed.insert("ja-JP".to_string(), "MongoDB接続失敗: {message}".to_string());
        translations.insert("error.mongodb_connection".to_string(), mongodb_connection_failed);

        // JSON解析失败
        let mut json_parse_failed = HashMap::new();
        json_parse_failed.insert("zh-CN".to_string(), "解析JSON字符串失败: {message}".to_string());
        json_parse_failed.insert("en-US".to_string(), "Failed to parse JSON string: {message}".to_string());
        json_parse_failed.insert("ja-JP".to_string(), "JSON文字列の解析失敗: {message}".to_string());
        translations.insert("error.json_parse".to_string(), json_parse_failed);

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}


/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
