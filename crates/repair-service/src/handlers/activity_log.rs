//! 操作日志 API 处理器
//!
//! 维修单的每一次变更都会写入操作日志，管理员可分页查询与清空。

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use tracing::{info, instrument};

use crate::auth::Claims;
use crate::dto::{
    ActivityLogDto, ActivityLogFilter, ApiResponse, ClearedResponse, PageResponse,
    PaginationParams,
};
use crate::error::Result;
use crate::models::ActivityLog;
use crate::state::AppState;

/// 查询操作日志（分页 + 过滤）
///
/// GET /api/admin/logs?page=&pageSize=&userLogin=&action=
#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ActivityLogFilter>,
) -> Result<Json<ApiResponse<PageResponse<ActivityLogDto>>>> {
    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM logs
        WHERE ($1::text IS NULL OR user_login = $1)
          AND ($2::text IS NULL OR action = $2)
        "#,
    )
    .bind(&filter.user_login)
    .bind(&filter.action)
    .fetch_one(&state.pool)
    .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            pagination.page,
            pagination.limit(),
        ))));
    }

    let rows = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT id, user_login, action, details, created_at
        FROM logs
        WHERE ($1::text IS NULL OR user_login = $1)
          AND ($2::text IS NULL OR action = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&filter.user_login)
    .bind(&filter.action)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<ActivityLogDto> = rows.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(PageResponse::new(
        items,
        total.0,
        pagination.page,
        pagination.limit(),
    ))))
}

/// 清空操作日志
///
/// DELETE /api/admin/logs
pub async fn clear_logs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<ClearedResponse>>> {
    let result = sqlx::query("DELETE FROM logs").execute(&state.pool).await?;
    let deleted_count = result.rows_affected() as i64;

    info!(operator = %claims.login, deleted_count, "操作日志已清空");
    Ok(Json(ApiResponse::success(ClearedResponse { deleted_count })))
}
