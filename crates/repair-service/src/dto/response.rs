//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActivityLog, LayoutItem, Repair, RepairStatus, RepairTab, Role};

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn empty(page: i64, page_size: i64) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
            total_pages: 0,
        }
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 删除成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn success() -> Self {
        Self { deleted: true }
    }
}

/// 批量清理响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedResponse {
    pub deleted_count: i64,
}

// ==================== 认证 ====================

/// 当前用户信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserDto {
    pub id: i64,
    pub login: String,
    pub role: Role,
    pub club_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token 过期时间戳（秒）
    pub expires_at: i64,
    pub user: CurrentUserDto,
}

// ==================== 维修单 ====================

/// 维修单响应 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairDto {
    pub id: i64,
    pub club_address: String,
    pub description: String,
    pub status: RepairStatus,
    pub pc_number: String,
    pub equipment_type: String,
    pub model: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Repair> for RepairDto {
    fn from(repair: Repair) -> Self {
        Self {
            id: repair.id,
            club_address: repair.club_address,
            description: repair.description,
            status: repair.status,
            pc_number: repair.pc_number,
            equipment_type: repair.equipment_type,
            model: repair.model,
            approved: repair.approved,
            created_at: repair.created_at,
            sent_at: repair.sent_at,
            closed_at: repair.closed_at,
            updated_at: repair.updated_at,
        }
    }
}

/// 分组计数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabCountDto {
    pub tab: RepairTab,
    pub count: i64,
}

/// 俱乐部视图列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairListResponse {
    pub items: Vec<RepairDto>,
    pub counts: Vec<TabCountDto>,
    /// 数据库侧的轮询水位，客户端下次轮询时作为 since 传回
    pub server_time: DateTime<Utc>,
}

/// 俱乐部计数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubCountDto {
    pub club_address: String,
    pub count: i64,
}

/// 快递员看板
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierBoardDto {
    /// 待确认取件
    pub pickup: Vec<RepairDto>,
    /// 已取件，待送往办公室
    pub to_office: Vec<RepairDto>,
    pub shipping: Vec<RepairDto>,
    pub delivery: Vec<RepairDto>,
    pub accepted: Vec<RepairDto>,
    pub club_counts: Vec<ClubCountDto>,
}

/// 管理员视图指标
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIndicatorsDto {
    /// Неисправно
    pub faulty: i64,
    /// Ожидание
    pub waiting: i64,
    /// В офисе
    pub in_office: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRepairListResponse {
    pub items: Vec<RepairDto>,
    pub indicators: AdminIndicatorsDto,
}

// ==================== 设备目录 ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDto {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentTypeDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentModelDto {
    pub id: i64,
    pub type_id: i64,
    pub model_name: String,
}

// ==================== 用户 ====================

/// 用户信息（不含密码哈希）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub login: String,
    pub role: Role,
    pub club_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==================== 操作日志 ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogDto {
    pub id: i64,
    pub user_login: String,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLog> for ActivityLogDto {
    fn from(log: ActivityLog) -> Self {
        Self {
            id: log.id,
            user_login: log.user_login,
            action: log.action,
            details: log.details,
            created_at: log.created_at,
        }
    }
}

// ==================== 总览 ====================

/// 俱乐部汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummaryDto {
    pub club_address: String,
    /// 仍在俱乐部侧的故障设备
    pub faulty: i64,
    /// 在办公室或送回途中
    pub in_office: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubStatsDto {
    pub faulty: i64,
    pub shipping: i64,
    pub in_repair: i64,
}

/// 单个俱乐部总览
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubOverviewDto {
    pub club_address: String,
    pub stats: ClubStatsDto,
    /// 有未关闭维修单的电脑编号
    pub faulty_pcs: Vec<String>,
    pub layout: Vec<LayoutItem>,
    /// false 表示返回的是默认布局
    pub layout_saved: bool,
    /// 有未关闭维修单的俱乐部地址
    pub active_addresses: Vec<String>,
}

// ==================== 状态卡片 ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardObjectDto {
    pub id: i64,
    pub name: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDto {
    pub id: i64,
    pub title: String,
    pub club_address: String,
    pub created_by: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub objects: Vec<CardObjectDto>,
}

// ==================== 系统 ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStatusDto {
    pub connected: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_response_total_pages_calculation() {
        let response = PageResponse::new(vec![1, 2, 3], 100, 2, 10);
        assert_eq!(response.total_pages, 10);
        assert_eq!(response.items.len(), 3);

        let response = PageResponse::<i32>::new(vec![], 101, 1, 10);
        assert_eq!(response.total_pages, 11);

        let response = PageResponse::<i32>::empty(1, 10);
        assert_eq!(response.total_pages, 0);
    }

    #[test]
    fn test_api_response_envelope() {
        let json = serde_json::to_value(ApiResponse::success(DeletedResponse::success())).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["code"], "SUCCESS");
        assert_eq!(json["data"]["deleted"], true);

        let json = serde_json::to_value(ApiResponse::<()>::success_empty()).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["success"], true);

        let json =
            serde_json::to_value(ApiResponse::success_with_message(5_i64, "Заявка создана")).unwrap();
        assert_eq!(json["message"], "Заявка создана");
        assert_eq!(json["data"], 5);
    }

    #[test]
    fn test_repair_dto_wire_format() {
        let now = Utc::now();
        let dto = RepairDto::from(Repair {
            id: 1,
            club_address: "Ленина 1".into(),
            description: "Нет изображения".into(),
            status: RepairStatus::DeliveringToClub,
            pc_number: "3".into(),
            equipment_type: "Монитор".into(),
            model: "LG".into(),
            approved: true,
            created_at: now,
            sent_at: Some(now),
            closed_at: None,
            updated_at: now,
        });

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["status"], "Доставка в клуб");
        assert_eq!(json["pcNumber"], "3");
        assert_eq!(json["clubAddress"], "Ленина 1");
        assert!(json["closedAt"].is_null());
    }

    #[test]
    fn test_board_field_names() {
        let json = serde_json::to_value(CourierBoardDto::default()).unwrap();
        for key in ["pickup", "toOffice", "shipping", "delivery", "accepted", "clubCounts"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
