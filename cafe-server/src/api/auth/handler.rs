//! Authentication Handlers
//!
//! Handles login and current-user lookups.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use shared::error::ErrorCode;
use shared::models::{LoginRequest, LoginResponse, UserInfo};

use crate::api::json_body;
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// 用于计时攻击防护的固定 Argon2 哈希
///
/// 用户不存在时也跑一次完整校验，使响应时间与密码错误时一致。
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$3KqzQm5Kr6oP6m2q5R3a5Jq3yq1m0x7l3j5a2b8c9dQ";

/// POST /api/auth/login - 店员/管理员登录
///
/// 用户名不存在与密码错误返回相同的错误，不泄露账号是否存在。
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let req = json_body(payload)?;
    let username = req.username.trim();

    let user = user::find_by_username(state.pool(), username).await?;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        found => {
            if found.is_none() {
                let _ = verify_password(&req.password, DUMMY_HASH);
            }
            security_log!(
                "WARN",
                "login_failed",
                username = username.to_string(),
                known_user = found.is_some()
            );
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_active {
        security_log!("WARN", "login_disabled", user_id = user.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(user.id, &user.username, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: jwt_service.expires_in_seconds(),
        user: UserInfo::from(&user),
    }))
}

/// GET /api/auth/me - 当前登录用户
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let user = user::find_by_id(state.pool(), current_user.id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(UserInfo::from(&user)))
}
