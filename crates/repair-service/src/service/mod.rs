//! 业务服务层
//!
//! - `workflow`: 维修单状态流转规则
//! - `repair_service`: 维修单创建、状态变更与编辑

pub mod repair_service;
pub mod workflow;

pub use repair_service::{CreateRepairInput, RepairService, ensure_club_access};
pub use workflow::RepairAction;
