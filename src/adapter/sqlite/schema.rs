//! SQLite表管理操作

use crate::adapter::SqliteAdapter;
use crate::error::SchemaResult;
use rat_logger::{debug, warn};
use sqlx::SqliteConnection;

/// 建表缓存的键，SQLite表名不区分大小写
fn cache_key(collection: &str) -> String {
    collection.to_ascii_lowercase()
}

/// 确保集合对应的表存在
pub(crate) async fn ensure_table(
    adapter: &SqliteAdapter,
    conn: &mut SqliteConnection,
    collection: &str,
) -> SchemaResult<String> {
    let table = adapter.table_identifier(collection)?;

    let mut created = adapter.created_tables.lock().await;
    if created.contains(&cache_key(collection)) {
        return Ok(table);
    }

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (_id INTEGER PRIMARY KEY AUTOINCREMENT, data TEXT NOT NULL)",
        table
    );
    debug!("执行SQLite建表: {}", sql);
    sqlx::query(&sql).execute(&mut *conn).await?;
    created.insert(cache_key(collection));
    Ok(table)
}

/// 表在缓存之外被删除后清除缓存并重新建表
pub(crate) async fn recreate_table(
    adapter: &SqliteAdapter,
    conn: &mut SqliteConnection,
    collection: &str,
) -> SchemaResult<String> {
    warn!("SQLite表 {} 已不存在，重新建表", collection);
    adapter.created_tables.lock().await.remove(&cache_key(collection));
    ensure_table(adapter, conn, collection).await
}

/// 判断错误是否为表不存在
pub(crate) fn is_missing_table(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.message().contains("no such table"),
        _ => false,
    }
}

/// 检查表是否存在，表名比较不区分大小写
pub(crate) async fn table_exists(conn: &mut SqliteConnection, collection: &str) -> SchemaResult<bool> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
    )
    .bind(collection)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.is_some())
}

/// 删除表，返回删除前表是否存在
pub(crate) async fn drop_table(
    adapter: &SqliteAdapter,
    conn: &mut SqliteConnection,
    collection: &str,
) -> SchemaResult<bool> {
    let table = adapter.table_identifier(collection)?;
    let existed = table_exists(&mut *conn, collection).await?;

    let sql = format!("DROP TABLE IF EXISTS {}", table);
    debug!("执行SQLite删表: {}", sql);
    sqlx::query(&sql).execute(&mut *conn).await?;

    adapter.created_tables.lock().await.remove(&cache_key(collection));
    Ok(existed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_folds_ascii_case() {
        assert_eq!(cache_key("Users"), cache_key("USERS"));
        assert_eq!(cache_key("users"), "users");
    }

    #[test]
    fn only_database_errors_mean_missing_table() {
        assert!(!is_missing_table(&sqlx::Error::RowNotFound));
        assert!(!is_missing_table(&sqlx::Error::PoolClosed));
    }
}
