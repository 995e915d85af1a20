//! 管理员维修单 API 处理器

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use super::repair::status_counts;
use crate::auth::Claims;
use crate::dto::{
    AdminIndicatorsDto, AdminRepairListResponse, AdminRepairQuery, ApiResponse,
    ChangeStatusRequest, RepairDto,
};
use crate::error::Result;
use crate::models::{REPAIR_COLUMNS, Repair, RepairStatus, status_names};
use crate::service::RepairAction;
use crate::state::AppState;

/// 顶部指标：Неисправно / Ожидание / В офисе
fn indicators(counts: &HashMap<RepairStatus, i64>) -> AdminIndicatorsDto {
    let count = |status: RepairStatus| counts.get(&status).copied().unwrap_or(0);
    AdminIndicatorsDto {
        faulty: count(RepairStatus::Faulty),
        waiting: count(RepairStatus::Shipping) + count(RepairStatus::WithCourier),
        in_office: count(RepairStatus::InRepair),
    }
}

/// 管理员维修单列表
///
/// GET /api/admin/repairs?tab=&club=
#[instrument(skip(state))]
pub async fn list_repairs(
    State(state): State<AppState>,
    Query(query): Query<AdminRepairQuery>,
) -> Result<Json<ApiResponse<AdminRepairListResponse>>> {
    let club = query.club_filter();
    let statuses = status_names(query.tab.statuses());

    let sql = format!(
        r#"
        SELECT {REPAIR_COLUMNS}
        FROM repairs
        WHERE status = ANY($1)
          AND ($2::text IS NULL OR club_address = $2)
        ORDER BY created_at DESC, id DESC
        "#
    );
    let rows = sqlx::query_as::<_, Repair>(&sql)
        .bind(&statuses)
        .bind(club)
        .fetch_all(&state.pool)
        .await?;

    let counts = status_counts(&state.pool, club).await?;

    Ok(Json(ApiResponse::success(AdminRepairListResponse {
        items: rows.into_iter().map(Into::into).collect(),
        indicators: indicators(&counts),
    })))
}

/// 管理员直接修改状态，不受流转规则限制
///
/// PUT /api/admin/repairs/{id}/status
pub async fn override_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    let repair = state
        .repair_service
        .perform(&claims, id, RepairAction::AdminOverride(req.status))
        .await?;

    Ok(Json(ApiResponse::success(repair.into())))
}
