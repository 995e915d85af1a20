//! 俱乐部总览与平面图 API 处理器

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use sqlx::types::Json as SqlJson;
use tracing::{info, instrument};

use super::repair::status_counts;
use crate::auth::Claims;
use crate::dto::{
    ApiResponse, ClubOverviewDto, ClubStatsDto, ClubSummaryDto, RepairDto, SaveLayoutRequest,
};
use crate::error::{AppError, Result};
use crate::models::{
    LayoutItem, REPAIR_COLUMNS, Repair, RepairStatus, default_layout, status_names,
    validate_layout,
};
use crate::state::AppState;

/// 设备仍在俱乐部侧的状态
const CLUB_SIDE_STATUSES: [RepairStatus; 4] = [
    RepairStatus::Faulty,
    RepairStatus::Shipping,
    RepairStatus::WithCourier,
    RepairStatus::AcceptedAtClub,
];

/// 设备在办公室或送回途中的状态
const OFFICE_SIDE_STATUSES: [RepairStatus; 2] =
    [RepairStatus::InRepair, RepairStatus::DeliveringToClub];

#[derive(sqlx::FromRow)]
struct ClubSummaryRow {
    club_address: String,
    faulty: i64,
    in_office: i64,
}

impl From<ClubSummaryRow> for ClubSummaryDto {
    fn from(row: ClubSummaryRow) -> Self {
        Self {
            club_address: row.club_address,
            faulty: row.faulty,
            in_office: row.in_office,
        }
    }
}

fn club_stats(counts: &HashMap<RepairStatus, i64>) -> ClubStatsDto {
    let count = |status: RepairStatus| counts.get(&status).copied().unwrap_or(0);
    ClubStatsDto {
        faulty: count(RepairStatus::Faulty),
        shipping: count(RepairStatus::Shipping) + count(RepairStatus::WithCourier),
        in_repair: count(RepairStatus::InRepair),
    }
}

/// 各俱乐部汇总
///
/// GET /api/admin/overview/summary
///
/// 包含所有已登记的俱乐部，以及有未关闭维修单但未登记的地址
#[instrument(skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<ClubSummaryDto>>>> {
    let rows = sqlx::query_as::<_, ClubSummaryRow>(
        r#"
        SELECT c.club_address,
               COUNT(r.id) FILTER (WHERE r.status = ANY($1)) AS faulty,
               COUNT(r.id) FILTER (WHERE r.status = ANY($2)) AS in_office
        FROM (
            SELECT name AS club_address FROM clubs
            UNION
            SELECT club_address FROM repairs WHERE status <> 'Закрыт'
        ) c
        LEFT JOIN repairs r
               ON r.club_address = c.club_address AND r.status <> 'Закрыт'
        GROUP BY c.club_address
        ORDER BY c.club_address
        "#,
    )
    .bind(status_names(&CLUB_SIDE_STATUSES))
    .bind(status_names(&OFFICE_SIDE_STATUSES))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// 单个俱乐部总览
///
/// GET /api/admin/overview/clubs/{club}
#[instrument(skip(state))]
pub async fn club_overview(
    State(state): State<AppState>,
    Path(club): Path<String>,
) -> Result<Json<ApiResponse<ClubOverviewDto>>> {
    let club = club.trim().to_string();

    let counts = status_counts(&state.pool, Some(&club)).await?;

    let faulty_pcs: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT pc_number
        FROM repairs
        WHERE club_address = $1 AND status <> 'Закрыт'
        ORDER BY pc_number
        "#,
    )
    .bind(&club)
    .fetch_all(&state.pool)
    .await?;

    let saved: Option<SqlJson<Vec<LayoutItem>>> =
        sqlx::query_scalar("SELECT layout FROM pc_layouts WHERE club_address = $1")
            .bind(&club)
            .fetch_optional(&state.pool)
            .await?;

    let active_addresses: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT club_address
        FROM repairs
        WHERE status <> 'Закрыт'
        ORDER BY club_address
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let layout_saved = saved.is_some();
    let layout = saved.map(|json| json.0).unwrap_or_else(default_layout);

    Ok(Json(ApiResponse::success(ClubOverviewDto {
        club_address: club,
        stats: club_stats(&counts),
        faulty_pcs,
        layout,
        layout_saved,
        active_addresses,
    })))
}

/// 保存平面图布局
///
/// PUT /api/admin/overview/clubs/{club}/layout
pub async fn save_layout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(club): Path<String>,
    Json(req): Json<SaveLayoutRequest>,
) -> Result<Json<ApiResponse<Vec<LayoutItem>>>> {
    let club = club.trim();
    if club.is_empty() {
        return Err(AppError::Validation("俱乐部地址不能为空".to_string()));
    }
    validate_layout(&req.items)?;

    sqlx::query(
        r#"
        INSERT INTO pc_layouts (club_address, layout, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (club_address)
        DO UPDATE SET layout = EXCLUDED.layout, updated_at = NOW()
        "#,
    )
    .bind(club)
    .bind(SqlJson(&req.items))
    .execute(&state.pool)
    .await?;

    info!(club = %club, items = req.items.len(), operator = %claims.login, "平面图已保存");
    Ok(Json(ApiResponse::success(req.items)))
}

/// 某台电脑的未关闭维修单
///
/// GET /api/admin/overview/clubs/{club}/pcs/{pc}/repairs
pub async fn pc_repairs(
    State(state): State<AppState>,
    Path((club, pc)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<RepairDto>>>> {
    let sql = format!(
        r#"
        SELECT {REPAIR_COLUMNS}
        FROM repairs
        WHERE club_address = $1 AND pc_number = $2 AND status <> 'Закрыт'
        ORDER BY created_at DESC, id DESC
        "#
    );
    let rows = sqlx::query_as::<_, Repair>(&sql)
        .bind(club.trim())
        .bind(pc.trim())
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_groups_cover_active_statuses_once() {
        for status in RepairStatus::ALL {
            let owners = CLUB_SIDE_STATUSES.contains(&status) as u8
                + OFFICE_SIDE_STATUSES.contains(&status) as u8;
            let expected = if status.is_active() { 1 } else { 0 };
            assert_eq!(owners, expected, "status {status}");
        }
    }

    #[test]
    fn test_club_stats() {
        let counts = HashMap::from([
            (RepairStatus::Faulty, 2),
            (RepairStatus::Shipping, 1),
            (RepairStatus::WithCourier, 1),
            (RepairStatus::InRepair, 3),
            (RepairStatus::DeliveringToClub, 7),
        ]);
        let stats = club_stats(&counts);
        assert_eq!(stats.faulty, 2);
        assert_eq!(stats.shipping, 2);
        assert_eq!(stats.in_repair, 3);
    }
}
