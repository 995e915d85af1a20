//! HTTP 请求处理器模块
//!
//! 按业务区域划分，角色限制在路由层统一挂载

pub mod activity_log;
pub mod admin_repair;
pub mod auth;
pub mod card;
pub mod courier;
pub mod equipment;
pub mod overview;
pub mod repair;
pub mod system;
pub mod user;
