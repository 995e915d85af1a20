//! 维修服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化。
//! 维修单状态与分组标签沿用俱乐部现场使用的俄文名称，库内与接口中均为原文。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Role {
    /// 俱乐部员工 - 只能看到本俱乐部的维修单
    #[default]
    User,
    /// 快递员 - 在俱乐部与维修办公室之间运送设备
    Courier,
    /// 管理员
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Courier => "courier",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 维修单状态
///
/// 生命周期：Неисправно → На отправке → У курьера → В ремонте → Доставка в клуб → Принято в клубе → Закрыт
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum RepairStatus {
    /// 故障，等待处理
    #[default]
    #[serde(rename = "Неисправно")]
    #[sqlx(rename = "Неисправно")]
    Faulty,
    /// 待发出
    #[serde(rename = "На отправке")]
    #[sqlx(rename = "На отправке")]
    Shipping,
    /// 已交给快递员
    #[serde(rename = "У курьера")]
    #[sqlx(rename = "У курьера")]
    WithCourier,
    /// 维修办公室处理中
    #[serde(rename = "В ремонте")]
    #[sqlx(rename = "В ремонте")]
    InRepair,
    /// 正在送回俱乐部
    #[serde(rename = "Доставка в клуб")]
    #[sqlx(rename = "Доставка в клуб")]
    DeliveringToClub,
    /// 俱乐部已签收
    #[serde(rename = "Принято в клубе")]
    #[sqlx(rename = "Принято в клубе")]
    AcceptedAtClub,
    /// 已关闭
    #[serde(rename = "Закрыт")]
    #[sqlx(rename = "Закрыт")]
    Closed,
}

impl RepairStatus {
    pub const ALL: [RepairStatus; 7] = [
        Self::Faulty,
        Self::Shipping,
        Self::WithCourier,
        Self::InRepair,
        Self::DeliveringToClub,
        Self::AcceptedAtClub,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faulty => "Неисправно",
            Self::Shipping => "На отправке",
            Self::WithCourier => "У курьера",
            Self::InRepair => "В ремонте",
            Self::DeliveringToClub => "Доставка в клуб",
            Self::AcceptedAtClub => "Принято в клубе",
            Self::Closed => "Закрыт",
        }
    }

    /// 未关闭的维修单视为活跃
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 将状态列表转换为 SQL `= ANY($n::text[])` 参数
pub fn status_names(statuses: &[RepairStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// 俱乐部视图分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairTab {
    #[serde(rename = "Ожидание")]
    Waiting,
    #[serde(rename = "На отправке")]
    Shipping,
    #[serde(rename = "В ремонте")]
    InRepair,
    #[serde(rename = "На получение")]
    Receiving,
    #[serde(rename = "История")]
    History,
}

impl RepairTab {
    pub const ALL: [RepairTab; 5] = [
        Self::Waiting,
        Self::Shipping,
        Self::InRepair,
        Self::Receiving,
        Self::History,
    ];

    pub fn statuses(&self) -> &'static [RepairStatus] {
        match self {
            Self::Waiting => &[RepairStatus::Faulty],
            Self::Shipping => &[RepairStatus::Shipping, RepairStatus::WithCourier],
            Self::InRepair => &[RepairStatus::InRepair],
            Self::Receiving => &[RepairStatus::DeliveringToClub, RepairStatus::AcceptedAtClub],
            Self::History => &[RepairStatus::Closed],
        }
    }
}

/// 管理员视图分组
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminRepairTab {
    #[serde(rename = "Все")]
    All,
    #[default]
    #[serde(rename = "Неисправно")]
    Faulty,
    #[serde(rename = "Ожидание")]
    Waiting,
    #[serde(rename = "В офисе")]
    InOffice,
    #[serde(rename = "Доставка")]
    Delivery,
    #[serde(rename = "Закрыт")]
    Closed,
}

impl AdminRepairTab {
    pub fn statuses(&self) -> &'static [RepairStatus] {
        match self {
            Self::All => &[
                RepairStatus::Faulty,
                RepairStatus::Shipping,
                RepairStatus::WithCourier,
                RepairStatus::InRepair,
                RepairStatus::DeliveringToClub,
                RepairStatus::AcceptedAtClub,
            ],
            Self::Faulty => &[RepairStatus::Faulty],
            Self::Waiting => &[RepairStatus::Shipping, RepairStatus::WithCourier],
            Self::InOffice => &[RepairStatus::InRepair],
            Self::Delivery => &[RepairStatus::DeliveringToClub, RepairStatus::AcceptedAtClub],
            Self::Closed => &[RepairStatus::Closed],
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// 仅返回固定关键字，可安全拼接进 ORDER BY
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_russian_names() {
        let json = serde_json::to_string(&RepairStatus::WithCourier).unwrap();
        assert_eq!(json, "\"У курьера\"");

        let status: RepairStatus = serde_json::from_str("\"Принято в клубе\"").unwrap();
        assert_eq!(status, RepairStatus::AcceptedAtClub);

        assert!(serde_json::from_str::<RepairStatus>("\"Broken\"").is_err());
    }

    #[test]
    fn test_only_closed_is_inactive() {
        let inactive: Vec<_> = RepairStatus::ALL
            .into_iter()
            .filter(|s| !s.is_active())
            .collect();
        assert_eq!(inactive, vec![RepairStatus::Closed]);
    }

    #[test]
    fn test_club_tabs_partition_all_statuses() {
        for status in RepairStatus::ALL {
            let owners = RepairTab::ALL
                .iter()
                .filter(|tab| tab.statuses().contains(&status))
                .count();
            assert_eq!(owners, 1, "状态 {status} 应恰好属于一个分组");
        }
    }

    #[test]
    fn test_admin_all_tab_excludes_closed() {
        let all = AdminRepairTab::All.statuses();
        assert_eq!(all.len(), 6);
        assert!(!all.contains(&RepairStatus::Closed));
        assert_eq!(AdminRepairTab::default(), AdminRepairTab::Faulty);
    }

    #[test]
    fn test_tab_query_values() {
        let tab: RepairTab = serde_json::from_str("\"На получение\"").unwrap();
        assert_eq!(tab, RepairTab::Receiving);
        let admin: AdminRepairTab = serde_json::from_str("\"В офисе\"").unwrap();
        assert_eq!(admin, AdminRepairTab::InOffice);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::from_str::<Role>("\"courier\"").unwrap(), Role::Courier);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::Courier.to_string(), "courier");
    }

    #[test]
    fn test_status_names() {
        assert_eq!(
            status_names(RepairTab::Shipping.statuses()),
            vec!["На отправке".to_string(), "У курьера".to_string()]
        );
    }
}
