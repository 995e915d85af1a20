//! 系统状态与探针

use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::dto::{ApiResponse, DbStatusDto};
use crate::error::Result;
use crate::state::AppState;

const SERVICE_NAME: &str = "repair-service";

/// 数据库连接状态
///
/// GET /api/admin/status
///
/// 查询失败不视为接口错误，通过 connected=false 返回
pub async fn db_status(State(state): State<AppState>) -> Result<Json<ApiResponse<DbStatusDto>>> {
    let check: std::result::Result<Option<i64>, sqlx::Error> =
        sqlx::query_scalar("SELECT id FROM repairs LIMIT 1")
            .fetch_optional(&state.pool)
            .await;

    let status = match check {
        Ok(_) => DbStatusDto {
            connected: true,
            message: "Подключение к базе данных установлено".to_string(),
        },
        Err(e) => {
            warn!(error = %e, "数据库状态检查失败");
            DbStatusDto {
                connected: false,
                message: format!("Ошибка подключения к базе данных: {}", e),
            }
        }
    };

    Ok(Json(ApiResponse::success(status)))
}

/// 存活探针：服务进程正常即返回 ok
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪探针：数据库不可用时返回 503
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(serde_json::json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "service": SERVICE_NAME,
            "checks": {
                "database": if db_ok { "ok" } else { "fail" }
            }
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body() {
        let Json(body) = tokio_test::block_on(health());
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], SERVICE_NAME);
    }
}
