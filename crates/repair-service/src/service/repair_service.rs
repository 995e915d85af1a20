//! 维修单服务
//!
//! 处理维修单创建、状态流转和字段编辑：
//! - 俱乐部归属检查（俱乐部员工只能操作本俱乐部的维修单）
//! - 状态流转规则校验（见 `workflow`）
//! - 变更与操作日志由仓储在同一事务中写入
//!
//! 多个角色同时操作同一维修单时以最后一次写入为准。

use std::sync::Arc;

use tracing::{info, instrument};

use repair_shared::observability::metrics;

use super::workflow::RepairAction;
use crate::auth::Claims;
use crate::error::{AppError, Result};
use crate::models::repair::{
    normalize_edited_description, normalize_edited_pc_number, normalize_new_description,
    normalize_new_pc_number,
};
use crate::models::{ActivityLog, NewRepair, Repair, RepairStatus, Role};
use crate::repository::{RepairRepository, RepairRepositoryTrait};

/// 新建维修单的输入
#[derive(Debug, Clone)]
pub struct CreateRepairInput {
    pub pc_number: String,
    pub equipment_type_id: i64,
    pub equipment_model_id: i64,
    pub description: String,
}

/// 维修单服务
pub struct RepairService<R = RepairRepository>
where
    R: RepairRepositoryTrait,
{
    repo: Arc<R>,
}

impl<R> RepairService<R>
where
    R: RepairRepositoryTrait,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 在调用者所属俱乐部创建维修单
    #[instrument(skip(self, claims, input), fields(login = %claims.login))]
    pub async fn create(&self, claims: &Claims, input: CreateRepairInput) -> Result<Repair> {
        let club_address = claims
            .club_address
            .as_deref()
            .map(str::trim)
            .filter(|club| !club.is_empty())
            .ok_or_else(|| AppError::Validation("当前账号未绑定俱乐部".to_string()))?;

        let pc_number = normalize_new_pc_number(&input.pc_number)?;
        let description = normalize_new_description(&input.description)?;

        let equipment_type = self
            .repo
            .club_type_name(club_address, input.equipment_type_id)
            .await?
            .ok_or_else(|| AppError::Validation("设备类型未关联到该俱乐部".to_string()))?;

        let model = self
            .repo
            .club_model_name(club_address, input.equipment_type_id, input.equipment_model_id)
            .await?
            .ok_or_else(|| {
                AppError::Validation("设备型号未关联到该俱乐部或不属于所选类型".to_string())
            })?;

        let new_repair = NewRepair {
            club_address: club_address.to_string(),
            description,
            pc_number,
            equipment_type,
            model,
        };

        let repair = self.repo.create_repair(&new_repair, &claims.login).await?;
        metrics::record_repair_created(&repair.club_address);

        info!(repair_id = repair.id, club = %repair.club_address, pc = %repair.pc_number, "维修单已创建");
        Ok(repair)
    }

    /// 执行状态动作
    #[instrument(skip(self, claims), fields(login = %claims.login, role = %claims.role))]
    pub async fn perform(&self, claims: &Claims, id: i64, action: RepairAction) -> Result<Repair> {
        let repair = self.load_accessible(claims, id).await?;

        let effect = action.plan(claims.role, &repair)?;
        let log = action.log(&claims.login, &repair);
        let updated = self.repo.apply_transition(id, &effect, &log).await?;

        metrics::record_repair_transition(action.name(), updated.status.as_str());
        info!(
            repair_id = id,
            action = action.name(),
            from = %repair.status,
            to = %updated.status,
            "维修单状态已变更"
        );
        Ok(updated)
    }

    /// 俱乐部视图的状态按钮
    ///
    /// 目标状态对应命名动作时按动作校验，管理员可指定其他任意状态。
    pub async fn change_status_from_club(
        &self,
        claims: &Claims,
        id: i64,
        target: RepairStatus,
    ) -> Result<Repair> {
        let action = match RepairAction::from_club_target(target) {
            Some(action) => action,
            None if claims.role == Role::Admin => RepairAction::AdminOverride(target),
            None => {
                let repair = self.load_accessible(claims, id).await?;
                return Err(AppError::InvalidTransition {
                    action: format!("set_status:{}", target),
                    from: repair.status,
                });
            }
        };
        self.perform(claims, id, action).await
    }

    /// 修改电脑编号，值未变化时不写入
    #[instrument(skip(self, claims), fields(login = %claims.login))]
    pub async fn edit_pc_number(&self, claims: &Claims, id: i64, raw: &str) -> Result<Repair> {
        let pc_number = normalize_edited_pc_number(raw)?;
        let repair = self.load_editable(claims, id).await?;

        if repair.pc_number == pc_number {
            return Ok(repair);
        }

        let log = ActivityLog::pc_number_changed(&claims.login, id, &repair.pc_number, &pc_number);
        self.repo.update_pc_number(id, &pc_number, &log).await
    }

    /// 修改描述，超长部分截断，值未变化时不写入
    #[instrument(skip(self, claims, raw), fields(login = %claims.login))]
    pub async fn edit_description(&self, claims: &Claims, id: i64, raw: &str) -> Result<Repair> {
        let description = normalize_edited_description(raw)?;
        let repair = self.load_editable(claims, id).await?;

        if repair.description == description {
            return Ok(repair);
        }

        let log = ActivityLog::description_changed(
            &claims.login,
            id,
            &repair.description,
            &description,
        );
        self.repo.update_description(id, &description, &log).await
    }

    /// 查询维修单并检查俱乐部归属
    async fn load_accessible(&self, claims: &Claims, id: i64) -> Result<Repair> {
        let repair = self
            .repo
            .get_repair(id)
            .await?
            .ok_or(AppError::RepairNotFound(id))?;

        ensure_club_access(claims, &repair)?;
        Ok(repair)
    }

    async fn load_editable(&self, claims: &Claims, id: i64) -> Result<Repair> {
        let repair = self.load_accessible(claims, id).await?;
        if !repair.status.is_active() {
            return Err(AppError::RepairClosed(id));
        }
        Ok(repair)
    }
}

/// 俱乐部员工只能访问本俱乐部的维修单，快递员与管理员不受限
pub fn ensure_club_access(claims: &Claims, repair: &Repair) -> Result<()> {
    if claims.role != Role::User {
        return Ok(());
    }
    match claims.club_address.as_deref() {
        Some(club) if club == repair.club_address => Ok(()),
        _ => Err(AppError::Forbidden("无权访问其他俱乐部的维修单".to_string())),
    }
}
