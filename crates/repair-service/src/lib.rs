//! 游戏俱乐部设备维修单服务
//!
//! 俱乐部员工登记故障设备，快递员在俱乐部与维修办公室之间运送，
//! 管理员维护设备目录、账号与俱乐部平面图。
//!
//! ## 核心功能
//!
//! - **维修单**：登记、按状态分组查看、编辑电脑编号与故障描述
//! - **状态流转**：按角色校验的状态机，每次变更写入操作日志
//! - **快递员看板**：取件、送修、送回三个方向的待办列表
//! - **后台管理**：俱乐部与设备目录、用户、操作日志、平面图总览、状态卡片
//!
//! ## 模块结构
//!
//! - `auth`: JWT 与密码哈希
//! - `middleware`: 认证与角色检查
//! - `models`: 状态、分组与实体
//! - `repository`: 维修单数据访问
//! - `service`: 状态流转规则与维修单服务
//! - `dto`: 请求和响应的数据传输对象
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{AppError, Result};
pub use models::{AdminRepairTab, RepairStatus, RepairTab, Role};
pub use service::{RepairAction, RepairService};
pub use state::AppState;
