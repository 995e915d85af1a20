//! 角色检查中间件
//!
//! 按路由分组限制可访问的角色，细粒度的俱乐部归属检查在服务层完成

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

use super::auth::unauthorized_response;
use crate::auth::Claims;
use crate::models::Role;

/// 角色检查中间件工厂
///
/// # 示例
/// ```ignore
/// Router::new()
///     .route("/users", get(list_users))
///     .route_layer(axum::middleware::from_fn(require_role(&[Role::Admin])))
/// ```
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
+ Clone
+ Send
+ Sync
+ 'static {
    move |request: Request<Body>, next: Next| -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin(check_role(request, next, roles))
    }
}

async fn check_role(request: Request<Body>, next: Next, roles: &'static [Role]) -> Response {
    // Claims 由 auth_middleware 注入
    let role = match request.extensions().get::<Claims>() {
        Some(claims) => claims.role,
        None => return unauthorized_response("未认证"),
    };

    if roles.contains(&role) {
        return next.run(request).await;
    }

    forbidden_response(&format!("角色 {} 无权访问该接口", role))
}

/// 生成 403 禁止访问响应
fn forbidden_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "FORBIDDEN",
        "message": message,
        "data": null
    });

    (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
}
