//! 维修单状态流转规则
//!
//! 每个动作声明允许的角色、允许的起始状态以及产生的变更。
//! 纯函数，不访问数据库。
//!
//! | 动作 | 角色 | 起始状态 | 结果 |
//! |------|------|----------|------|
//! | MarkForShipping | user, admin | Неисправно | На отправке |
//! | HandToCourier | user, courier, admin | На отправке | У курьера |
//! | AcceptAtClub | user, admin | Доставка в клуб | Принято в клубе |
//! | ConfirmPickup | courier | У курьера（未确认） | approved, sent_at |
//! | CancelPickup | courier | У курьера | Неисправно |
//! | DeliverToOffice | courier | У курьера（已确认） | В ремонте |
//! | ReturnToClub | courier | На отправке | Неисправно |
//! | ReturnToRepair | courier | Доставка в клуб | В ремонте |
//! | Close | courier | Принято в клубе | Закрыт |
//! | AdminOverride | admin | 任意 | 指定状态 |

use crate::error::{AppError, Result};
use crate::models::{ActivityLog, Repair, RepairStatus, Role, TransitionEffect, actions};

/// 维修单动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairAction {
    MarkForShipping,
    HandToCourier,
    AcceptAtClub,
    ConfirmPickup,
    CancelPickup,
    DeliverToOffice,
    ReturnToClub,
    ReturnToRepair,
    Close,
    /// 管理员直接指定状态
    AdminOverride(RepairStatus),
}

impl RepairAction {
    /// 动作名称，用于错误信息和指标标签
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarkForShipping => "mark_for_shipping",
            Self::HandToCourier => "hand_to_courier",
            Self::AcceptAtClub => "accept_at_club",
            Self::ConfirmPickup => "confirm_pickup",
            Self::CancelPickup => "cancel_pickup",
            Self::DeliverToOffice => "deliver_to_office",
            Self::ReturnToClub => "return_to_club",
            Self::ReturnToRepair => "return_to_repair",
            Self::Close => "close",
            Self::AdminOverride(_) => "admin_override",
        }
    }

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::MarkForShipping | Self::AcceptAtClub => &[Role::User, Role::Admin],
            Self::HandToCourier => &[Role::User, Role::Courier, Role::Admin],
            Self::ConfirmPickup
            | Self::CancelPickup
            | Self::DeliverToOffice
            | Self::ReturnToClub
            | Self::ReturnToRepair
            | Self::Close => &[Role::Courier],
            Self::AdminOverride(_) => &[Role::Admin],
        }
    }

    /// 当前状态（及快递员确认标记）下是否允许执行
    pub fn is_allowed_from(&self, status: RepairStatus, approved: bool) -> bool {
        use RepairStatus::*;
        match self {
            Self::MarkForShipping => status == Faulty,
            Self::HandToCourier => status == Shipping,
            Self::AcceptAtClub => status == DeliveringToClub,
            Self::ConfirmPickup => status == WithCourier && !approved,
            Self::CancelPickup => status == WithCourier,
            Self::DeliverToOffice => status == WithCourier && approved,
            Self::ReturnToClub => status == Shipping,
            Self::ReturnToRepair => status == DeliveringToClub,
            Self::Close => status == AcceptedAtClub,
            Self::AdminOverride(_) => true,
        }
    }

    pub fn effect(&self) -> TransitionEffect {
        use RepairStatus::*;
        match *self {
            Self::MarkForShipping => TransitionEffect::status(Shipping),
            Self::HandToCourier => TransitionEffect::status(WithCourier),
            Self::AcceptAtClub => TransitionEffect::status(AcceptedAtClub),
            Self::ConfirmPickup => TransitionEffect {
                approved: Some(true),
                set_sent_at: true,
                ..TransitionEffect::status(WithCourier)
            },
            Self::CancelPickup | Self::ReturnToClub => TransitionEffect {
                approved: Some(false),
                ..TransitionEffect::status(Faulty)
            },
            Self::DeliverToOffice | Self::ReturnToRepair => TransitionEffect::status(InRepair),
            Self::Close => TransitionEffect {
                set_closed_at: true,
                ..TransitionEffect::status(Closed)
            },
            Self::AdminOverride(target) => TransitionEffect {
                set_sent_at: target == InRepair,
                set_closed_at: target == Closed,
                ..TransitionEffect::status(target)
            },
        }
    }

    pub fn log_action(&self) -> &'static str {
        match self {
            Self::MarkForShipping
            | Self::HandToCourier
            | Self::AcceptAtClub
            | Self::AdminOverride(_) => actions::STATUS_CHANGED,
            Self::ConfirmPickup => actions::COURIER_CONFIRMED,
            Self::CancelPickup => actions::COURIER_CANCELLED,
            Self::DeliverToOffice => actions::COURIER_DELIVERED,
            Self::ReturnToClub => actions::COURIER_RETURNED,
            Self::ReturnToRepair => actions::COURIER_RETURNED_TO_REPAIR,
            Self::Close => actions::COURIER_CLOSED,
        }
    }

    /// 构建操作日志，repair 为变更前的维修单
    pub fn log(&self, actor_login: &str, repair: &Repair) -> ActivityLog {
        if self.log_action() == actions::STATUS_CHANGED {
            ActivityLog::status_changed(actor_login, repair.id, self.effect().status)
        } else {
            ActivityLog::courier_action(actor_login, self.log_action(), repair)
        }
    }

    /// 俱乐部视图的状态按钮对应的动作
    pub fn from_club_target(target: RepairStatus) -> Option<Self> {
        match target {
            RepairStatus::Shipping => Some(Self::MarkForShipping),
            RepairStatus::WithCourier => Some(Self::HandToCourier),
            RepairStatus::AcceptedAtClub => Some(Self::AcceptAtClub),
            _ => None,
        }
    }

    /// 快递员接口路径中的动作名
    pub fn from_courier_path(segment: &str) -> Option<Self> {
        match segment {
            "confirm" => Some(Self::ConfirmPickup),
            "cancel" => Some(Self::CancelPickup),
            "deliver" => Some(Self::DeliverToOffice),
            "return" => Some(Self::ReturnToClub),
            "return-to-repair" => Some(Self::ReturnToRepair),
            "close" => Some(Self::Close),
            _ => None,
        }
    }

    /// 校验角色与起始状态，返回需要写入的变更
    pub fn plan(&self, role: Role, repair: &Repair) -> Result<TransitionEffect> {
        if !self.allowed_roles().contains(&role) {
            return Err(AppError::Forbidden(format!(
                "角色 {} 不能执行操作 {}",
                role,
                self.name()
            )));
        }

        if !self.is_allowed_from(repair.status, repair.approved) {
            return Err(AppError::InvalidTransition {
                action: self.name().to_string(),
                from: repair.status,
            });
        }

        Ok(self.effect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn repair(status: RepairStatus, approved: bool) -> Repair {
        let now = Utc::now();
        Repair {
            id: 5,
            club_address: "Мира 10".to_string(),
            description: "Не включается".to_string(),
            status,
            pc_number: "PS5".to_string(),
            equipment_type: "Консоль".to_string(),
            model: "Slim".to_string(),
            approved,
            created_at: now,
            sent_at: None,
            closed_at: None,
            updated_at: now,
        }
    }

    const COURIER_ACTIONS: [RepairAction; 6] = [
        RepairAction::ConfirmPickup,
        RepairAction::CancelPickup,
        RepairAction::DeliverToOffice,
        RepairAction::ReturnToClub,
        RepairAction::ReturnToRepair,
        RepairAction::Close,
    ];

    #[test]
    fn test_happy_path_through_lifecycle() {
        use RepairStatus::*;
        let steps = [
            (RepairAction::MarkForShipping, Role::User, Faulty, false, Shipping),
            (RepairAction::HandToCourier, Role::Courier, Shipping, false, WithCourier),
            (RepairAction::ConfirmPickup, Role::Courier, WithCourier, false, WithCourier),
            (RepairAction::DeliverToOffice, Role::Courier, WithCourier, true, InRepair),
            (RepairAction::AdminOverride(DeliveringToClub), Role::Admin, InRepair, true, DeliveringToClub),
            (RepairAction::AcceptAtClub, Role::User, DeliveringToClub, true, AcceptedAtClub),
            (RepairAction::Close, Role::Courier, AcceptedAtClub, true, Closed),
        ];

        for (action, role, from, approved, expected) in steps {
            let effect = action.plan(role, &repair(from, approved)).unwrap();
            assert_eq!(effect.status, expected, "action={action:?}");
        }
    }

    #[test]
    fn test_confirm_requires_unapproved_and_sets_sent_at() {
        let effect = RepairAction::ConfirmPickup
            .plan(Role::Courier, &repair(RepairStatus::WithCourier, false))
            .unwrap();
        assert_eq!(effect.approved, Some(true));
        assert!(effect.set_sent_at);

        let err = RepairAction::ConfirmPickup
            .plan(Role::Courier, &repair(RepairStatus::WithCourier, true))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn test_deliver_requires_confirmation() {
        let err = RepairAction::DeliverToOffice
            .plan(Role::Courier, &repair(RepairStatus::WithCourier, false))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    }

    #[test]
    fn test_cancel_and_return_reset_approval() {
        for (action, from) in [
            (RepairAction::CancelPickup, RepairStatus::WithCourier),
            (RepairAction::ReturnToClub, RepairStatus::Shipping),
        ] {
            let effect = action.plan(Role::Courier, &repair(from, true)).unwrap();
            assert_eq!(effect.status, RepairStatus::Faulty);
            assert_eq!(effect.approved, Some(false));
        }
    }

    #[test]
    fn test_close_sets_closed_at() {
        let effect = RepairAction::Close.effect();
        assert_eq!(effect.status, RepairStatus::Closed);
        assert!(effect.set_closed_at);
        assert!(!effect.set_sent_at);
    }

    #[test]
    fn test_courier_actions_forbidden_for_club_staff_and_admin() {
        for action in COURIER_ACTIONS {
            for role in [Role::User, Role::Admin] {
                let err = action.plan(role, &repair(RepairStatus::WithCourier, false)).unwrap_err();
                assert!(matches!(err, AppError::Forbidden(_)), "{action:?} by {role}");
            }
        }
    }

    #[test]
    fn test_courier_cannot_mark_for_shipping() {
        let err = RepairAction::MarkForShipping
            .plan(Role::Courier, &repair(RepairStatus::Faulty, false))
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_wrong_source_status_is_conflict() {
        let err = RepairAction::MarkForShipping
            .plan(Role::User, &repair(RepairStatus::InRepair, false))
            .unwrap_err();
        match err {
            AppError::InvalidTransition { action, from } => {
                assert_eq!(action, "mark_for_shipping");
                assert_eq!(from, RepairStatus::InRepair);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_admin_override_from_any_status() {
        for from in RepairStatus::ALL {
            for target in RepairStatus::ALL {
                let effect = RepairAction::AdminOverride(target)
                    .plan(Role::Admin, &repair(from, false))
                    .unwrap();
                assert_eq!(effect.status, target);
                assert_eq!(effect.set_sent_at, target == RepairStatus::InRepair);
                assert_eq!(effect.set_closed_at, target == RepairStatus::Closed);
                assert_eq!(effect.approved, None);
            }
        }
        assert!(RepairAction::AdminOverride(RepairStatus::Closed)
            .plan(Role::Courier, &repair(RepairStatus::Faulty, false))
            .is_err());
    }

    #[test]
    fn test_log_entries() {
        let r = repair(RepairStatus::WithCourier, false);

        let log = RepairAction::ConfirmPickup.log("courier", &r);
        assert_eq!(log.action, "Курьер подтвердил получение");
        assert_eq!(log.details.as_deref(), Some("ID: 5, клуб: Мира 10, ПК: PS5"));

        let log = RepairAction::AdminOverride(RepairStatus::Closed).log("admin", &r);
        assert_eq!(log.action, "Изменение статуса заявки");
        assert_eq!(log.details.as_deref(), Some("ID: 5, новый статус: Закрыт"));
    }

    #[test]
    fn test_path_and_target_parsing() {
        assert_eq!(
            RepairAction::from_courier_path("return-to-repair"),
            Some(RepairAction::ReturnToRepair)
        );
        assert_eq!(RepairAction::from_courier_path("teleport"), None);
        for action in COURIER_ACTIONS {
            assert_eq!(action.allowed_roles(), &[Role::Courier]);
        }

        assert_eq!(
            RepairAction::from_club_target(RepairStatus::AcceptedAtClub),
            Some(RepairAction::AcceptAtClub)
        );
        assert_eq!(RepairAction::from_club_target(RepairStatus::InRepair), None);
    }
}
