//! 认证相关的 HTTP 处理器
//!
//! 提供登录、登出、获取当前用户和刷新 Token 的 API

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use sqlx::FromRow;
use tracing::{info, warn};
use validator::Validate;

use repair_shared::observability::metrics;

use crate::auth::{Claims, verify_dummy_password, verify_password};
use crate::dto::{ApiResponse, CurrentUserDto, LoginRequest, LoginResponse};
use crate::error::{AppError, Result};
use crate::models::Role;
use crate::state::AppState;

/// Token 刷新响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub expires_at: i64,
}

/// 数据库用户记录
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    login: String,
    password_hash: String,
    role: Role,
    club_address: Option<String>,
}

impl From<UserRow> for CurrentUserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            login: row.login,
            role: row.role,
            club_address: row.club_address,
        }
    }
}

/// 用户登录
///
/// POST /api/auth/login
///
/// 登录名不存在与密码错误返回相同的错误
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let user: Option<UserRow> = sqlx::query_as(
        r#"
        SELECT id, login, password_hash, role, club_address
        FROM users
        WHERE login = $1
        "#,
    )
    .bind(req.login.trim())
    .fetch_optional(&state.pool)
    .await?;

    let verified = match &user {
        Some(user) => verify_password(&req.password, &user.password_hash)?,
        None => {
            // 登录名不存在时同样执行一次 bcrypt
            verify_dummy_password(&req.password);
            false
        }
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            metrics::record_login_attempt(false);
            warn!(login = %req.login, "登录失败");
            return Err(AppError::InvalidCredentials);
        }
    };

    let (token, expires_at) = state.jwt_manager.generate_token(
        user.id,
        &user.login,
        user.role,
        user.club_address.as_deref(),
    )?;

    metrics::record_login_attempt(true);
    info!(login = %user.login, role = %user.role, "用户登录");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at,
        user: user.into(),
    })))
}

/// 用户登出
///
/// POST /api/auth/logout
pub async fn logout(Extension(claims): Extension<Claims>) -> Result<Json<ApiResponse<()>>> {
    // JWT 无状态，前端清除 Token 即可
    info!(login = %claims.login, "用户登出");
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 按 Token 中的用户 ID 读取数据库记录，不存在时返回 401
async fn load_token_user(state: &AppState, claims: &Claims) -> Result<UserRow> {
    let user_id = claims.user_id()?;

    sqlx::query_as(
        r#"
        SELECT id, login, password_hash, role, club_address
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("用户不存在".to_string()))
}

/// 获取当前用户信息
///
/// GET /api/auth/me
///
/// 以数据库中的记录为准，账号被删除后旧 Token 不再有效
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<CurrentUserDto>>> {
    let user = load_token_user(&state, &claims).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// 刷新 Token
///
/// POST /api/auth/refresh
///
/// 新 Token 的角色与俱乐部取自当前数据库记录
pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<RefreshResponse>>> {
    let user = load_token_user(&state, &claims).await?;

    let (token, expires_at) = state.jwt_manager.generate_token(
        user.id,
        &user.login,
        user.role,
        user.club_address.as_deref(),
    )?;

    if user.role != claims.role || user.club_address != claims.club_address {
        info!(login = %user.login, role = %user.role, "刷新 Token 时账号信息已变更");
    }

    Ok(Json(ApiResponse::success(RefreshResponse {
        token,
        expires_at,
    })))
}
