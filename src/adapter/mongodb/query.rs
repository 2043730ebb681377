//! MongoDB查询选项构建

use crate::types::FindOptions;
use mongodb::bson::doc;

/// 把分页与排序选项翻译为驱动的查找选项
///
/// limit 为 0 时不限制数量，与驱动语义一致
pub(crate) fn build_find_options(options: &FindOptions) -> mongodb::options::FindOptions {
    let mut find_options = mongodb::options::FindOptions::default();

    if let Some(field) = &options.order_by {
        find_options.sort = Some(doc! { field.as_str(): options.direction().as_i32() });
    }
    if options.offset > 0 {
        find_options.skip = Some(options.offset);
    }
    find_options.limit = options
        .limit
        .filter(|limit| *limit > 0)
        .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));

    find_options
}
