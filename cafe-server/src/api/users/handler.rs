//! User API Handlers

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use shared::error::ErrorCode;
use shared::models::{UserCreate, UserInfo};

use crate::api::json_body;
use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::utils::validation::{MAX_NAME_LEN, check_password, require_text};
use crate::utils::{AppError, AppResult};

/// POST /api/users - 创建店员/管理员账号
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    let payload = json_body(payload)?;
    let username = payload.username.trim();
    require_text(username, "username", MAX_NAME_LEN)?;
    check_password(&payload.password, "password")?;

    let hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let created = user::create(state.pool(), username, &hash, payload.role)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::UsernameExists,
                format!("Username '{username}' is taken"),
            )
            .with_detail("field", "username"),
            other => other.into(),
        })?;

    tracing::info!(
        user_id = created.id,
        username = %created.username,
        role = %created.role,
        created_by = current_user.id,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(UserInfo::from(&created))))
}
