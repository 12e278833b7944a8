//! 认证中间件
//!
//! 顾客从不登录，所以认证是宽松的：没有令牌的请求匿名通过，
//! 由路由组上的 [`require_roles`] 决定是否放行。

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use shared::error::ErrorCode;
use shared::models::Role;

use crate::AppError;
use crate::auth::jwt::bearer_token;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 店员操作 (订单、菜单写入、桌台状态、统计)
pub const STAFF_ROLES: &[Role] = &[Role::Staff, Role::Admin];

/// 管理员操作 (桌台维护、用户管理)
pub const ADMIN_ROLES: &[Role] = &[Role::Admin];

/// 认证中间件 - 解析可选的 Bearer 令牌
///
/// | 请求 | 结果 |
/// |------|------|
/// | 无 Authorization 头 | 匿名继续 |
/// | 有效令牌 | 注入 [`CurrentUser`] 后继续 |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌/格式错误 | 401 TokenInvalid |
pub async fn authenticate(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS 预检
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(header) = auth_header {
        let user = user_from_header(state.get_jwt_service(), header, req.uri())?;
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}

/// 校验 `Authorization` 头并解析出当前用户
pub(crate) fn user_from_header(
    jwt_service: &JwtService,
    header: &str,
    uri: &Uri,
) -> Result<CurrentUser, AppError> {
    let token = bearer_token(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let result = jwt_service
        .validate_token(token)
        .and_then(CurrentUser::try_from);

    result.map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", uri)
        );
        match e {
            JwtError::Expired => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

/// 角色检查中间件
///
/// 必须位于 [`authenticate`] 之后。
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/orders", get(handler::list))
///     .layer(middleware::from_fn(require_roles(STAFF_ROLES)));
/// ```
///
/// # 错误
///
/// 未登录返回 401，角色不符返回 403 RoleRequired
pub fn require_roles(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_any_role(roles) {
                let required: Vec<&str> = roles.iter().map(Role::as_str).collect();
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id,
                    username = user.username.clone(),
                    user_role = user.role.as_str(),
                    uri = format!("{:?}", req.uri())
                );
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    format!("Requires role: {}", required.join(" or ")),
                )
                .with_detail("required", required));
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;

    fn jwt() -> JwtService {
        JwtService::new(JwtConfig::with_secret(
            "test-secret-that-is-long-enough-for-hs256",
        ))
    }

    #[test]
    fn test_user_from_valid_header() {
        let jwt = jwt();
        let token = jwt.generate_token(3, "kim", Role::Admin).unwrap();
        let user = user_from_header(&jwt, &format!("Bearer {token}"), &Uri::from_static("/api/me"))
            .unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_bad_headers() {
        let jwt = jwt();
        let uri = Uri::from_static("/api/orders");

        let err = user_from_header(&jwt, "Token abc", &uri).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);

        let err = user_from_header(&jwt, "Bearer not.a.jwt", &uri).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
    }
}
