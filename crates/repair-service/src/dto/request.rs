//! 请求 DTO 定义
//!
//! 所有 REST API 的请求体与查询参数结构

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::{AdminRepairTab, LayoutItem, RepairStatus, RepairTab, Role, SortOrder};

// ==================== 认证 ====================

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100, message = "登录名不能为空"))]
    pub login: String,
    #[validate(length(min = 1, max = 128, message = "密码不能为空"))]
    pub password: String,
}

// ==================== 维修单 ====================

/// 新建维修单
///
/// 电脑编号与描述的格式由领域函数校验
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepairRequest {
    pub pc_number: String,
    #[validate(range(min = 1, message = "请选择设备类型"))]
    pub equipment_type_id: i64,
    #[validate(range(min = 1, message = "请选择设备型号"))]
    pub equipment_model_id: i64,
    pub description: String,
}

/// 状态变更请求（俱乐部视图与管理员共用）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: RepairStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePcNumberRequest {
    pub pc_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescriptionRequest {
    pub description: String,
}

/// 俱乐部视图查询
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairListQuery {
    pub tab: Option<RepairTab>,
    #[serde(default)]
    pub sort: SortOrder,
    /// 只返回此时间之后有变更的维修单，用于轮询
    pub since: Option<DateTime<Utc>>,
}

/// 快递员看板查询
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierBoardQuery {
    /// 按俱乐部地址模糊匹配
    pub club: Option<String>,
}

/// 管理员维修单查询
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRepairQuery {
    #[serde(default)]
    pub tab: AdminRepairTab,
    /// 精确匹配，空值或 "Все" 表示全部俱乐部
    pub club: Option<String>,
}

impl AdminRepairQuery {
    pub fn club_filter(&self) -> Option<&str> {
        self.club
            .as_deref()
            .map(str::trim)
            .filter(|club| !club.is_empty() && *club != "Все")
    }
}

// ==================== 设备目录 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    #[validate(length(min = 1, max = 255, message = "俱乐部名称长度必须在1-255个字符之间"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentTypeRequest {
    #[validate(length(min = 1, max = 100, message = "设备类型名称长度必须在1-100个字符之间"))]
    pub name: String,
    /// 同时关联到该俱乐部
    pub club_address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttachClubTypeRequest {
    #[validate(range(min = 1, message = "设备类型 ID 无效"))]
    pub equipment_type_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentModelRequest {
    #[validate(length(min = 1, max = 100, message = "型号名称长度必须在1-100个字符之间"))]
    pub model_name: String,
    #[validate(length(min = 1, max = 255, message = "俱乐部地址不能为空"))]
    pub club_address: String,
}

// ==================== 用户 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "登录名长度必须在1-100个字符之间"))]
    pub login: String,
    #[validate(length(min = 1, max = 128, message = "密码不能为空"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub club_address: Option<String>,
}

// ==================== 操作日志 ====================

/// 分页查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// 计算数据库查询的 offset
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.limit())
    }

    /// 获取限制条数（最大100）
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, 100)
    }
}

/// 操作日志查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogFilter {
    pub user_login: Option<String>,
    pub action: Option<String>,
}

// ==================== 平面图 ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLayoutRequest {
    pub items: Vec<LayoutItem>,
}

// ==================== 状态卡片 ====================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardQuery {
    pub club: Option<String>,
    /// true 时返回已删除的卡片
    #[serde(default)]
    pub history: bool,
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CardObjectInput {
    #[validate(length(min = 1, max = 200, message = "对象名称长度必须在1-200个字符之间"))]
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[validate(length(min = 1, max = 255, message = "俱乐部地址不能为空"))]
    pub club_address: String,
    #[validate(length(min = 1, max = 200, message = "卡片标题长度必须在1-200个字符之间"))]
    pub title: String,
    #[serde(default)]
    #[validate(nested)]
    pub objects: Vec<CardObjectInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[validate(length(min = 1, max = 200, message = "卡片标题长度必须在1-200个字符之间"))]
    pub title: String,
    #[serde(default)]
    #[validate(nested)]
    pub objects: Vec<CardObjectInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
    }

    #[test]
    fn test_pagination_offset() {
        let params = PaginationParams {
            page: 3,
            page_size: 10,
        };
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);

        // page 为 0 时 offset 为 0，page_size 超过100时被限制
        let params = PaginationParams {
            page: 0,
            page_size: 200,
        };
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn test_pagination_offset_saturates() {
        let params = PaginationParams {
            page: i64::MAX,
            page_size: 100,
        };
        assert_eq!(params.offset(), i64::MAX);

        let params = PaginationParams {
            page: i64::MIN,
            page_size: 20,
        };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_login_request_validation() {
        let request = LoginRequest {
            login: "".into(),
            password: "x".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_repair_request_camel_case() {
        let request: CreateRepairRequest = serde_json::from_str(
            r#"{"pcNumber":"7","equipmentTypeId":1,"equipmentModelId":2,"description":"Нет звука"}"#,
        )
        .unwrap();
        assert_eq!(request.pc_number, "7");
        assert!(request.validate().is_ok());

        let bad: CreateRepairRequest = serde_json::from_str(
            r#"{"pcNumber":"7","equipmentTypeId":0,"equipmentModelId":2,"description":"x"}"#,
        )
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: RepairListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.sort, SortOrder::Desc);
        assert!(query.tab.is_none());

        let query: RepairListQuery =
            serde_json::from_str(r#"{"tab":"История","sort":"asc","since":"2026-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(query.tab, Some(RepairTab::History));
        assert_eq!(query.sort, SortOrder::Asc);
        assert!(query.since.is_some());
    }

    #[test]
    fn test_admin_club_filter() {
        let mut query = AdminRepairQuery::default();
        assert_eq!(query.tab, AdminRepairTab::Faulty);
        assert_eq!(query.club_filter(), None);

        query.club = Some("Все".into());
        assert_eq!(query.club_filter(), None);

        query.club = Some(" Ленина 1 ".into());
        assert_eq!(query.club_filter(), Some("Ленина 1"));
    }

    #[test]
    fn test_card_request_nested_validation() {
        let request = CreateCardRequest {
            club_address: "Ленина 1".into(),
            title: "Стойка".into(),
            objects: vec![CardObjectInput {
                name: "".into(),
                comment: String::new(),
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_user_default_role() {
        let request: CreateUserRequest =
            serde_json::from_str(r#"{"login":"club1","password":"pw"}"#).unwrap();
        assert_eq!(request.role, Role::User);
        assert!(request.club_address.is_none());
    }
}
