//! 密码处理
//!
//! 提供密码哈希和验证功能

use std::sync::LazyLock;

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::AppError;

/// 登录名不存在时用于比对的哈希
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("repair-service-unknown-login").ok());

/// 使用 bcrypt 生成密码哈希
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(format!("密码哈希失败: {}", e)))
}

/// 比较明文密码与存储的哈希值
///
/// 存储值不是合法 bcrypt 哈希时视为不匹配，不向调用方暴露内部错误
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if !hash.starts_with("$2") {
        tracing::warn!("存储的密码哈希格式无效");
        return Ok(false);
    }
    verify(password, hash).map_err(|e| AppError::Internal(format!("密码验证失败: {}", e)))
}

/// 对占位哈希执行一次校验，使未知登录名与密码错误的耗时一致
pub fn verify_dummy_password(password: &str) {
    if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = verify(password, dummy);
    }
}
