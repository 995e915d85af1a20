//! 认证模块
//!
//! 提供 JWT Token 生成、验证、密码处理以及初始管理员引导

mod bootstrap;
mod jwt;
mod password;

pub use bootstrap::ensure_bootstrap_admin;
pub use jwt::{Claims, JwtConfig, JwtManager};
pub use password::{hash_password, verify_dummy_password, verify_password};
