//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ActivityLog, NewRepair, Repair, TransitionEffect};

/// 维修单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepairRepositoryTrait: Send + Sync {
    async fn get_repair(&self, id: i64) -> Result<Option<Repair>>;

    // 俱乐部设备目录
    async fn club_type_name(&self, club_address: &str, type_id: i64) -> Result<Option<String>>;
    async fn club_model_name(
        &self,
        club_address: &str,
        type_id: i64,
        model_id: i64,
    ) -> Result<Option<String>>;

    // 写操作，均附带操作日志
    async fn create_repair(&self, repair: &NewRepair, actor_login: &str) -> Result<Repair>;
    async fn apply_transition(
        &self,
        id: i64,
        effect: &TransitionEffect,
        log: &ActivityLog,
    ) -> Result<Repair>;
    async fn update_pc_number(&self, id: i64, pc_number: &str, log: &ActivityLog)
    -> Result<Repair>;
    async fn update_description(
        &self,
        id: i64,
        description: &str,
        log: &ActivityLog,
    ) -> Result<Repair>;
}
