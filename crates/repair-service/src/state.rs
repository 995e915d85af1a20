//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::JwtManager;
use crate::repository::RepairRepository;
use crate::service::RepairService;

/// Axum 应用共享状态
///
/// 连接池本身可廉价克隆，其余组件通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// JWT 签发与校验
    pub jwt_manager: Arc<JwtManager>,
    /// 维修单状态流转
    pub repair_service: Arc<RepairService>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, jwt_manager: JwtManager) -> Self {
        let repo = Arc::new(RepairRepository::new(pool.clone()));
        Self {
            repair_service: Arc::new(RepairService::new(repo)),
            jwt_manager: Arc::new(jwt_manager),
            pool,
        }
    }
}
