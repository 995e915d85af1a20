//! 用户管理 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use tracing::info;
use validator::Validate;

use crate::auth::{Claims, hash_password};
use crate::dto::{ApiResponse, CreateUserRequest, DeletedResponse, UserDto};
use crate::error::{AppError, Result};
use crate::models::Role;
use crate::state::AppState;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    login: String,
    role: Role,
    club_address: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            login: row.login,
            role: row.role,
            club_address: row.club_address,
            created_at: row.created_at,
        }
    }
}

/// 用户列表（不含密码哈希）
///
/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<UserDto>>>> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, login, role, club_address, created_at
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// 创建用户
///
/// POST /api/admin/users
///
/// 俱乐部员工必须绑定俱乐部
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    req.validate()?;

    let login = req.login.trim();
    if login.is_empty() {
        return Err(AppError::Validation("登录名不能为空".to_string()));
    }
    let club_address = req
        .club_address
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if req.role == Role::User && club_address.is_none() {
        return Err(AppError::Validation("俱乐部员工必须指定俱乐部".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (login, password_hash, role, club_address, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING id, login, role, club_address, created_at
        "#,
    )
    .bind(login)
    .bind(&password_hash)
    .bind(req.role)
    .bind(club_address)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, format!("登录名已存在: {}", login)))?;

    info!(user_id = row.id, login = %row.login, role = %row.role, "用户已创建");
    Ok(Json(ApiResponse::success(row.into())))
}

/// 删除用户
///
/// DELETE /api/admin/users/{id}
///
/// 管理员不能删除自己
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    if claims.user_id()? == id {
        return Err(AppError::Validation("不能删除当前登录的账号".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::UserNotFound(id));
    }

    info!(user_id = id, operator = %claims.login, "用户已删除");
    Ok(Json(ApiResponse::success(DeletedResponse::success())))
}
