//! 文档构造相关的宏定义

/// 便捷宏：构造查询/文档树
///
/// ```ignore
/// let query = document! {
///     "name" => "John Doe",
///     "meta" => document! { "age" => 30 },
/// };
/// ```
#[macro_export]
macro_rules! document {
    () => {
        $crate::types::Document::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::types::Document::new();
        $(
            document.insert(($key).to_string(), $crate::types::DataValue::from($value));
        )+
        document
    }};
}

/// 便捷宏：按声明顺序构造字段列表
///
/// ```ignore
/// let schema = Schema::builder("users")
///     .fields(fields! {
///         "name" => string_field().build()?,
///         "email" => email_field().build()?,
///     })
///     .database(db)
///     .build()?;
/// ```
#[macro_export]
macro_rules! fields {
    ($($name:expr => $field:expr),* $(,)?) => {
        vec![$((($name).to_string(), $field)),*]
    };
}

#[cfg(test)]
mod tests {
    use crate::types::DataValue;

    #[test]
    fn document_macro_nests() {
        let doc = document! {
            "name" => "John",
            "meta" => document! { "age" => 30 },
        };
        assert_eq!(doc.get("name"), Some(&DataValue::from("John")));
        assert_eq!(
            DataValue::Object(doc).get_path("meta.age"),
            Some(&DataValue::Int(30))
        );
        assert!(document! {}.is_empty());
    }
}
