//! 初始管理员引导
//!
//! 空库启动时没有任何账号可登录，按配置创建第一个管理员。

use sqlx::PgPool;
use tracing::info;

use super::hash_password;
use crate::error::Result;
use crate::models::Role;

/// 若库中不存在管理员，则以给定登录名和密码创建一个
///
/// 返回是否实际创建了账号
pub async fn ensure_bootstrap_admin(pool: &PgPool, login: &str, password: &str) -> Result<bool> {
    let admin_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = $1)")
            .bind(Role::Admin)
            .fetch_one(pool)
            .await?;

    if admin_exists {
        return Ok(false);
    }

    let password_hash = hash_password(password)?;
    let result = sqlx::query(
        r#"
        INSERT INTO users (login, password_hash, role, club_address)
        VALUES ($1, $2, $3, NULL)
        ON CONFLICT (login) DO NOTHING
        "#,
    )
    .bind(login)
    .bind(&password_hash)
    .bind(Role::Admin)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        info!(login = %login, "已创建初始管理员账号");
    }
    Ok(created)
}
