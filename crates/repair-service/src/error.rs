//! 维修服务错误类型定义
//!
//! 所有 HTTP 处理器与服务层共用的错误类型，统一映射为 JSON 响应体

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::models::RepairStatus;

/// 维修服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("用户名或密码错误")]
    InvalidCredentials,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("维修单不存在: {0}")]
    RepairNotFound(i64),
    #[error("用户不存在: {0}")]
    UserNotFound(i64),
    #[error("卡片不存在: {0}")]
    CardNotFound(i64),
    #[error("设备类型不存在: {0}")]
    EquipmentTypeNotFound(i64),
    #[error("资源不存在: {0}")]
    NotFound(String),

    // 业务冲突
    #[error("资源已存在: {0}")]
    Conflict(String),
    #[error("当前状态「{from}」不允许执行操作: {action}")]
    InvalidTransition { action: String, from: RepairStatus },
    #[error("维修单已关闭，无法修改: {0}")]
    RepairClosed(i64),
    #[error("卡片已删除，无法修改: {0}")]
    CardDeleted(i64),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_) => StatusCode::BAD_REQUEST,

            Self::RepairNotFound(_)
            | Self::UserNotFound(_)
            | Self::CardNotFound(_)
            | Self::EquipmentTypeNotFound(_)
            | Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::Conflict(_)
            | Self::InvalidTransition { .. }
            | Self::RepairClosed(_)
            | Self::CardDeleted(_) => StatusCode::CONFLICT,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RepairNotFound(_) => "REPAIR_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::CardNotFound(_) => "CARD_NOT_FOUND",
            Self::EquipmentTypeNotFound(_) => "EQUIPMENT_TYPE_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::RepairClosed(_) => "REPAIR_CLOSED",
            Self::CardDeleted(_) => "CARD_DELETED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 将唯一约束冲突转换为 Conflict，其余数据库错误原样保留
    pub fn on_unique_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict(message.into()),
            _ => Self::Database(err),
        }
    }

    /// 将外键约束冲突转换为 NotFound
    pub fn on_foreign_key_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::NotFound(message.into())
            }
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 JSON 序列化错误转换
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON 处理错误: {}", err))
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    /// 所有可简单构造的错误变体及其期望的 (StatusCode, error_code)
    fn all_error_variants() -> Vec<(AppError, StatusCode, &'static str)> {
        vec![
            (AppError::Unauthorized("token expired".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("admin only".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            (AppError::Validation("pcNumber".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (AppError::RepairNotFound(10), StatusCode::NOT_FOUND, "REPAIR_NOT_FOUND"),
            (AppError::UserNotFound(20), StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            (AppError::CardNotFound(30), StatusCode::NOT_FOUND, "CARD_NOT_FOUND"),
            (AppError::EquipmentTypeNotFound(40), StatusCode::NOT_FOUND, "EQUIPMENT_TYPE_NOT_FOUND"),
            (AppError::NotFound("club".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Conflict("login".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::InvalidTransition {
                    action: "confirm".into(),
                    from: RepairStatus::Faulty,
                },
                StatusCode::CONFLICT,
                "INVALID_STATUS_TRANSITION",
            ),
            (AppError::RepairClosed(50), StatusCode::CONFLICT, "REPAIR_CLOSED"),
            (AppError::CardDeleted(60), StatusCode::CONFLICT, "CARD_DELETED"),
            (AppError::Internal("unexpected state".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "状态码不匹配: variant={label}"
            );
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(
                error.error_code(),
                expected_code,
                "错误码不匹配: expected={expected_code}"
            );
        }
    }

    #[test]
    fn test_display_contains_context() {
        assert!(AppError::RepairNotFound(7).to_string().contains('7'));
        assert!(AppError::Validation("pcNumber".into()).to_string().contains("pcNumber"));
        let transition = AppError::InvalidTransition {
            action: "close".into(),
            from: RepairStatus::InRepair,
        };
        let msg = transition.to_string();
        assert!(msg.contains("В ремонте"), "{msg}");
        assert!(msg.contains("close"), "{msg}");
    }

    #[tokio::test]
    async fn test_into_response_body_structure() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let label = format!("{:?}", error);
            let response = error.into_response();

            assert_eq!(response.status(), expected_status, "响应状态码不匹配: {label}");

            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("读取响应体失败");
            let body: serde_json::Value =
                serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

            assert_eq!(body["success"], json!(false), "success 字段应为 false: {label}");
            assert_eq!(body["code"], json!(expected_code), "code 字段不匹配: {label}");
            assert!(!body["message"].as_str().unwrap_or("").is_empty(), "message 不应为空: {label}");
            assert!(body["data"].is_null(), "data 字段应为 null: {label}");
        }
    }

    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let response = AppError::Internal("stack overflow at module X".into()).into_response();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("stack overflow"));
        assert!(message.contains("服务内部错误"));
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        let mut field_error = ValidationError::new("length");
        field_error.message = Some("描述不能超过 80 个字符".into());
        errors.add("description", field_error);

        let err: AppError = errors.into();
        match &err {
            AppError::Validation(msg) => assert!(msg.contains("description"), "{msg}"),
            other => panic!("期望 Validation 变体，实际: {:?}", other),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_sqlx_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_non_constraint_errors_stay_database() {
        let err = AppError::on_unique_violation(sqlx::Error::PoolTimedOut, "dup");
        assert!(matches!(err, AppError::Database(_)));
        let err = AppError::on_foreign_key_violation(sqlx::Error::PoolTimedOut, "fk");
        assert!(matches!(err, AppError::Database(_)));
    }
}
