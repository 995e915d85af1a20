//! 游戏俱乐部设备维修单服务
//!
//! 提供维修单流转、快递员看板与后台管理的 REST API。

use axum::{
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use repair_service::{
    auth::{JwtConfig, JwtManager, ensure_bootstrap_admin},
    routes,
    state::AppState,
};
use repair_shared::{
    config::AppConfig,
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "repair-service";
const DEV_JWT_SECRET: &str = "repair-service-dev-secret-change-in-production";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：default.toml -> {env}.toml -> {service}.toml -> REPAIR_ 环境变量
    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config.observability.clone().with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let db = Database::connect(&config.database).await.inspect_err(|e| {
        error!(code = e.code(), error = %e, "Database connection failed");
    })?;
    if config.database.run_migrations {
        db.run_migrations().await.inspect_err(|e| {
            error!(code = e.code(), error = %e, "Database migration failed");
        })?;
    }

    // JWT 密钥：生产环境必须通过 REPAIR_AUTH__JWT_SECRET 注入
    let jwt_secret = match config.auth.jwt_secret.clone() {
        Some(secret) if !secret.trim().is_empty() => secret,
        _ if config.is_production() => {
            anyhow::bail!("REPAIR_AUTH__JWT_SECRET must be set in production environment")
        }
        _ => {
            warn!("Using default JWT secret - set REPAIR_AUTH__JWT_SECRET for production");
            DEV_JWT_SECRET.to_string()
        }
    };

    let jwt_manager = JwtManager::new(JwtConfig {
        secret: jwt_secret,
        expires_in_secs: config.auth.jwt_expires_secs,
        issuer: SERVICE_NAME.to_string(),
    });

    // 首次启动时创建管理员
    match config.auth.bootstrap_admin_password.as_deref() {
        Some(password) if !password.is_empty() => {
            let created =
                ensure_bootstrap_admin(db.pool(), &config.auth.bootstrap_admin_login, password)
                    .await?;
            if created {
                info!(login = %config.auth.bootstrap_admin_login, "Bootstrap admin created");
            }
        }
        _ => info!("No bootstrap admin password configured, skipping admin bootstrap"),
    }

    let state = AppState::new(db.pool().clone(), jwt_manager);
    let cors = cors_layer(&config.server.cors_origins, config.is_production());

    let app = routes::app(state)
        // HTTP 安全头
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        // 请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 后停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 根据逗号分隔的来源列表构建 CORS 层，"*" 表示允许全部
fn cors_layer(allowed_origins: &str, production: bool) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        if production {
            warn!("cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    // 依赖 CSP，显式关闭旧的 XSS 过滤
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    response
}

/// 监听关闭信号（SIGTERM 或 Ctrl+C）
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
