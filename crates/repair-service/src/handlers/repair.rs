//! 维修单 API 处理器（俱乐部视图）
//!
//! 创建、列表查询、状态按钮以及电脑编号与描述的编辑。
//! 写操作经由 `RepairService`，变更与日志在同一事务内写入。

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, ChangeStatusRequest, CreateRepairRequest, RepairDto, RepairListQuery,
    RepairListResponse, TabCountDto, UpdateDescriptionRequest, UpdatePcNumberRequest,
};
use crate::error::{AppError, Result};
use crate::models::{REPAIR_COLUMNS, Repair, RepairStatus, RepairTab, Role, status_names};
use crate::service::{CreateRepairInput, ensure_club_access};
use crate::state::AppState;

/// 调用者可见的俱乐部范围，None 表示全部俱乐部
///
/// 快递员看全部俱乐部；管理员未绑定俱乐部时同样看全部
fn visible_club(claims: &Claims) -> Result<Option<String>> {
    match claims.role {
        Role::Courier => Ok(None),
        Role::Admin => Ok(claims.club_address.clone().filter(|c| !c.is_empty())),
        Role::User => claims.require_club().map(|club| Some(club.to_string())),
    }
}

/// 按状态统计维修单数量
pub(crate) async fn status_counts(
    pool: &PgPool,
    club_address: Option<&str>,
) -> Result<HashMap<RepairStatus, i64>> {
    let rows: Vec<(RepairStatus, i64)> = sqlx::query_as(
        r#"
        SELECT status, COUNT(*)
        FROM repairs
        WHERE ($1::text IS NULL OR club_address = $1)
        GROUP BY status
        "#,
    )
    .bind(club_address)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// 将状态计数归并到俱乐部视图分组，没有维修单的分组计为 0
pub(crate) fn tab_counts(counts: &HashMap<RepairStatus, i64>) -> Vec<TabCountDto> {
    RepairTab::ALL
        .iter()
        .map(|tab| TabCountDto {
            tab: *tab,
            count: tab
                .statuses()
                .iter()
                .map(|s| counts.get(s).copied().unwrap_or(0))
                .sum(),
        })
        .collect()
}

/// 轮询水位：数据库时钟与所有未结束事务开始时间中的较早者
///
/// `updated_at` 取自写事务的 `NOW()`（事务开始时间），尚未提交的写入
/// 其 `updated_at` 不早于本值，因此下次以 `since` 传回时不会漏掉
async fn poll_watermark(pool: &PgPool) -> Result<DateTime<Utc>> {
    let watermark = sqlx::query_scalar(
        r#"
        SELECT LEAST(NOW(), COALESCE(MIN(xact_start), NOW())) - INTERVAL '1 microsecond'
        FROM pg_stat_activity
        WHERE datname = current_database()
          AND xact_start IS NOT NULL
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(watermark)
}

/// 查询维修单列表
///
/// GET /api/repairs?tab=&sort=&since=
#[instrument(skip(state, claims), fields(login = %claims.login))]
pub async fn list_repairs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RepairListQuery>,
) -> Result<Json<ApiResponse<RepairListResponse>>> {
    let club = visible_club(&claims)?;
    // 必须在列表查询之前取水位
    let server_time = poll_watermark(&state.pool).await?;
    let statuses = query.tab.map(|tab| status_names(tab.statuses()));

    // 排序方向只来自枚举的固定关键字
    let order = query.sort.as_sql();
    let sql = format!(
        r#"
        SELECT {REPAIR_COLUMNS}
        FROM repairs
        WHERE ($1::text IS NULL OR club_address = $1)
          AND ($2::text[] IS NULL OR status = ANY($2))
          AND ($3::timestamptz IS NULL OR updated_at > $3)
        ORDER BY created_at {order}, id {order}
        "#
    );

    let rows = sqlx::query_as::<_, Repair>(&sql)
        .bind(club.as_deref())
        .bind(statuses)
        .bind(query.since)
        .fetch_all(&state.pool)
        .await?;

    let counts = status_counts(&state.pool, club.as_deref()).await?;

    Ok(Json(ApiResponse::success(RepairListResponse {
        items: rows.into_iter().map(Into::into).collect(),
        counts: tab_counts(&counts),
        server_time,
    })))
}

/// 获取维修单详情
///
/// GET /api/repairs/{id}
pub async fn get_repair(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    let sql = format!("SELECT {REPAIR_COLUMNS} FROM repairs WHERE id = $1");
    let repair = sqlx::query_as::<_, Repair>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::RepairNotFound(id))?;

    ensure_club_access(&claims, &repair)?;
    Ok(Json(ApiResponse::success(repair.into())))
}

/// 创建维修单
///
/// POST /api/repairs
pub async fn create_repair(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateRepairRequest>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    req.validate()?;

    let input = CreateRepairInput {
        pc_number: req.pc_number,
        equipment_type_id: req.equipment_type_id,
        equipment_model_id: req.equipment_model_id,
        description: req.description,
    };
    let repair = state.repair_service.create(&claims, input).await?;

    Ok(Json(ApiResponse::success_with_message(
        repair.into(),
        "维修单已创建",
    )))
}

/// 俱乐部视图状态按钮
///
/// POST /api/repairs/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    let repair = state
        .repair_service
        .change_status_from_club(&claims, id, req.status)
        .await?;

    Ok(Json(ApiResponse::success(repair.into())))
}

/// 修改电脑编号
///
/// PATCH /api/repairs/{id}/pc-number
pub async fn update_pc_number(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePcNumberRequest>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    let repair = state
        .repair_service
        .edit_pc_number(&claims, id, &req.pc_number)
        .await?;

    Ok(Json(ApiResponse::success(repair.into())))
}

/// 修改描述
///
/// PATCH /api/repairs/{id}/description
pub async fn update_description(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDescriptionRequest>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    let repair = state
        .repair_service
        .edit_description(&claims, id, &req.description)
        .await?;

    Ok(Json(ApiResponse::success(repair.into())))
}
