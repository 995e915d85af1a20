//! 快递员看板 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use crate::auth::Claims;
use crate::dto::{ApiResponse, ClubCountDto, CourierBoardDto, CourierBoardQuery, RepairDto};
use crate::error::{AppError, Result};
use crate::models::{REPAIR_COLUMNS, Repair, RepairStatus, status_names};
use crate::service::RepairAction;
use crate::state::AppState;

/// 看板上出现的状态
const BOARD_STATUSES: [RepairStatus; 4] = [
    RepairStatus::Shipping,
    RepairStatus::WithCourier,
    RepairStatus::DeliveringToClub,
    RepairStatus::AcceptedAtClub,
];

/// 将维修单分到看板各列，顺序保持不变
fn build_board(rows: Vec<Repair>, club_counts: Vec<ClubCountDto>) -> CourierBoardDto {
    let mut board = CourierBoardDto {
        club_counts,
        ..Default::default()
    };

    for repair in rows {
        let column = match (repair.status, repair.approved) {
            (RepairStatus::WithCourier, false) => &mut board.pickup,
            (RepairStatus::WithCourier, true) => &mut board.to_office,
            (RepairStatus::Shipping, _) => &mut board.shipping,
            (RepairStatus::DeliveringToClub, _) => &mut board.delivery,
            (RepairStatus::AcceptedAtClub, _) => &mut board.accepted,
            _ => continue,
        };
        column.push(RepairDto::from(repair));
    }

    board
}

/// 快递员看板
///
/// GET /api/courier/board?club=
///
/// club 为俱乐部地址的子串（不区分大小写）；俱乐部计数不受 club 过滤影响
#[instrument(skip(state))]
pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<CourierBoardQuery>,
) -> Result<Json<ApiResponse<CourierBoardDto>>> {
    let statuses = status_names(&BOARD_STATUSES);
    let club = query
        .club
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let sql = format!(
        r#"
        SELECT {REPAIR_COLUMNS}
        FROM repairs
        WHERE status = ANY($1)
          AND ($2::text IS NULL OR strpos(lower(club_address), lower($2)) > 0)
        ORDER BY created_at DESC, id DESC
        "#
    );
    let rows = sqlx::query_as::<_, Repair>(&sql)
        .bind(&statuses)
        .bind(club)
        .fetch_all(&state.pool)
        .await?;

    let counts: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT c.club_address, COUNT(r.id)
        FROM (
            SELECT name AS club_address FROM clubs
            UNION
            SELECT club_address FROM repairs WHERE status = ANY($1)
        ) c
        LEFT JOIN repairs r
               ON r.club_address = c.club_address AND r.status = ANY($1)
        GROUP BY c.club_address
        ORDER BY c.club_address
        "#,
    )
    .bind(&statuses)
    .fetch_all(&state.pool)
    .await?;

    let club_counts = counts
        .into_iter()
        .map(|(club_address, count)| ClubCountDto {
            club_address,
            count,
        })
        .collect();

    Ok(Json(ApiResponse::success(build_board(rows, club_counts))))
}

/// 快递员动作
///
/// POST /api/courier/repairs/{id}/{action}
///
/// action: confirm | cancel | deliver | return | return-to-repair | close
pub async fn perform_action(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, action)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<RepairDto>>> {
    let action = RepairAction::from_courier_path(&action)
        .ok_or_else(|| AppError::NotFound(format!("未知的快递员操作: {}", action)))?;

    let repair = state.repair_service.perform(&claims, id, action).await?;
    Ok(Json(ApiResponse::success(repair.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn repair(id: i64, status: RepairStatus, approved: bool) -> Repair {
        let now = Utc::now();
        Repair {
            id,
            club_address: "Ленина 1".into(),
            description: "-".into(),
            status,
            pc_number: "1".into(),
            equipment_type: "ПК".into(),
            model: "-".into(),
            approved,
            created_at: now,
            sent_at: None,
            closed_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_build_board_partitions_by_status_and_approval() {
        let rows = vec![
            repair(1, RepairStatus::WithCourier, false),
            repair(2, RepairStatus::WithCourier, true),
            repair(3, RepairStatus::Shipping, false),
            repair(4, RepairStatus::DeliveringToClub, true),
            repair(5, RepairStatus::AcceptedAtClub, true),
            repair(6, RepairStatus::WithCourier, false),
            repair(7, RepairStatus::InRepair, true),
        ];

        let board = build_board(rows, vec![]);
        let ids = |list: &[RepairDto]| list.iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(ids(&board.pickup), vec![1, 6]);
        assert_eq!(ids(&board.to_office), vec![2]);
        assert_eq!(ids(&board.shipping), vec![3]);
        assert_eq!(ids(&board.delivery), vec![4]);
        assert_eq!(ids(&board.accepted), vec![5]);
    }

    #[test]
    fn test_board_statuses_exclude_office_and_closed() {
        assert!(!BOARD_STATUSES.contains(&RepairStatus::InRepair));
        assert!(!BOARD_STATUSES.contains(&RepairStatus::Closed));
        assert!(!BOARD_STATUSES.contains(&RepairStatus::Faulty));
    }
}
