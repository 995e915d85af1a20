//! 操作日志模型
//!
//! 记录用户对维修单的每一次变更，供管理员审计。
//! action 与 details 为展示给俱乐部管理员的俄文文案。

use chrono::{DateTime, Utc};

use super::{Repair, RepairStatus};

/// 日志动作名称
pub mod actions {
    pub const REPAIR_CREATED: &str = "Создание заявки";
    pub const STATUS_CHANGED: &str = "Изменение статуса заявки";
    pub const PC_NUMBER_CHANGED: &str = "Изменение номера ПК";
    pub const DESCRIPTION_CHANGED: &str = "Изменение описания заявки";
    pub const COURIER_CONFIRMED: &str = "Курьер подтвердил получение";
    pub const COURIER_CANCELLED: &str = "Курьер отменил заявку";
    pub const COURIER_DELIVERED: &str = "Курьер отметил как \"в офисе\"";
    pub const COURIER_RETURNED: &str = "Курьер вернул заявку";
    pub const COURIER_RETURNED_TO_REPAIR: &str = "Курьер вернул в ремонт";
    pub const COURIER_CLOSED: &str = "Курьер закрыл заявку";
}

/// 操作日志实体
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: i64,
    /// 操作人登录名
    pub user_login: String,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// 构建新的操作日志
    pub fn new(user_login: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: 0,
            user_login: user_login.into(),
            action: action.into(),
            details: None,
            created_at: Utc::now(),
        }
    }

    /// 设置详情
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn repair_created(user_login: &str, repair: &Repair) -> Self {
        Self::new(user_login, actions::REPAIR_CREATED).with_details(format!(
            "ID: {}, ПК: {}, Описание: {}",
            repair.id, repair.pc_number, repair.description
        ))
    }

    pub fn status_changed(user_login: &str, repair_id: i64, status: RepairStatus) -> Self {
        Self::new(user_login, actions::STATUS_CHANGED)
            .with_details(format!("ID: {}, новый статус: {}", repair_id, status))
    }

    pub fn pc_number_changed(user_login: &str, repair_id: i64, old: &str, new: &str) -> Self {
        Self::new(user_login, actions::PC_NUMBER_CHANGED)
            .with_details(format!("ID: {}, с \"{}\" на \"{}\"", repair_id, old, new))
    }

    pub fn description_changed(user_login: &str, repair_id: i64, old: &str, new: &str) -> Self {
        Self::new(user_login, actions::DESCRIPTION_CHANGED)
            .with_details(format!("ID: {}, c \"{}\" на \"{}\"", repair_id, old, new))
    }

    /// 快递员动作统一记录俱乐部与电脑编号
    pub fn courier_action(user_login: &str, action: &str, repair: &Repair) -> Self {
        Self::new(user_login, action).with_details(format!(
            "ID: {}, клуб: {}, ПК: {}",
            repair.id, repair.club_address, repair.pc_number
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repair() -> Repair {
        let now = Utc::now();
        Repair {
            id: 17,
            club_address: "Ленина 1".to_string(),
            description: "Не работает мышь".to_string(),
            status: RepairStatus::Faulty,
            pc_number: "12".to_string(),
            equipment_type: "Мышь".to_string(),
            model: "G102".to_string(),
            approved: false,
            created_at: now,
            sent_at: None,
            closed_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_builder() {
        let log = ActivityLog::new("admin", "x").with_details("y");
        assert_eq!(log.user_login, "admin");
        assert_eq!(log.details.as_deref(), Some("y"));
    }

    #[test]
    fn test_repair_created_details() {
        let log = ActivityLog::repair_created("club1", &sample_repair());
        assert_eq!(log.action, "Создание заявки");
        assert_eq!(
            log.details.as_deref(),
            Some("ID: 17, ПК: 12, Описание: Не работает мышь")
        );
    }

    #[test]
    fn test_edit_details_quote_old_and_new() {
        let log = ActivityLog::pc_number_changed("club1", 17, "12", "PS5");
        assert_eq!(log.details.as_deref(), Some("ID: 17, с \"12\" на \"PS5\""));

        let log = ActivityLog::status_changed("club1", 17, RepairStatus::Shipping);
        assert_eq!(log.details.as_deref(), Some("ID: 17, новый статус: На отправке"));
    }

    #[test]
    fn test_courier_details() {
        let log = ActivityLog::courier_action("courier", actions::COURIER_CONFIRMED, &sample_repair());
        assert_eq!(log.details.as_deref(), Some("ID: 17, клуб: Ленина 1, ПК: 12"));
    }
}
