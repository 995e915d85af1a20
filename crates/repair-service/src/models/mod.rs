//! 维修服务模型模块
//!
//! 包含维修单、操作日志、平面图布局等实体与枚举

pub mod activity_log;
pub mod enums;
pub mod layout;
pub mod repair;

// 重新导出常用类型
pub use activity_log::{ActivityLog, actions};
pub use enums::{AdminRepairTab, RepairStatus, RepairTab, Role, SortOrder, status_names};
pub use layout::{LayoutItem, LayoutItemKind, default_layout, validate_layout};
pub use repair::{NewRepair, REPAIR_COLUMNS, Repair, TransitionEffect};
