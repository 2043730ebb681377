//! 多语言错误消息测试

use rat_schema::i18n::{set_language, t, tf};

#[test]
fn messages_follow_selected_language() {
    rat_schema::init();

    set_language("en-US");
    assert_eq!(
        tf("error.field_name_duplicate", &[("name", "age")]),
        "Field name 'age' is duplicated"
    );

    set_language("zh-CN");
    assert_eq!(t("error.record_deleted"), "记录已删除，无法保存");
}
