//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、当前用户
//! - [`users`] - 用户管理 (管理员)
//! - [`menu`] - 菜单
//! - [`orders`] - 订单
//! - [`tables`] - 桌台
//! - [`analytics`] - 统计
//! - [`ws`] - 实时事件流
//!
//! 认证在全局中间件中完成，各路由组通过 `require_roles` 声明所需角色。

pub mod analytics;
pub mod auth;
pub mod health;
pub mod menu;
pub mod orders;
pub mod tables;
pub mod users;
pub mod ws;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use axum::{Router, middleware};
use http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn routes() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(menu::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(analytics::router())
        .merge(ws::router())
}

/// Fully configured application: routes, authentication, CORS and tracing
pub fn build_router(state: ServerState) -> Router {
    let cors = cors_layer(state.config.cors_allow_origin.as_deref());

    routes()
        // Get user context (JWT) - executes before routes, injects CurrentUser
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::authenticate,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allow_origin else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS_ALLOW_ORIGIN, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

/// Unwrap a JSON body, reporting malformed input as a validation error
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::validation(e.body_text()))
}

/// Unwrap query parameters, reporting malformed input as a validation error
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|e| AppError::validation(e.body_text()))
}

/// Unwrap path parameters, reporting a malformed id as a validation error
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(value)| value)
        .map_err(|e| AppError::validation(e.body_text()))
}
