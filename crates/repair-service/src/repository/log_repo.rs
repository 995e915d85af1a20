//! 操作日志写入

use sqlx::PgConnection;

use crate::error::Result;
use crate::models::ActivityLog;

/// 在调用方的事务中写入一条操作日志
pub async fn insert_log(conn: &mut PgConnection, log: &ActivityLog) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO logs (user_login, action, details, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING id
        "#,
    )
    .bind(&log.user_login)
    .bind(&log.action)
    .bind(&log.details)
    .fetch_one(conn)
    .await?;

    Ok(id)
}
