//! Menu API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuQuery};

use crate::api::{json_body, path_param, query_params};
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/menu - 菜单列表 (?category=&activeOnly=)
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<MenuQuery>, QueryRejection>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let query = query_params(query)?;
    let items = state.menu.list(&query).await?;
    Ok(Json(items))
}

/// GET /api/menu/:id - 单个菜单项
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MenuItem>> {
    let id = path_param(id)?;
    let item = state.menu.get(id).await?;
    Ok(Json(item))
}

/// POST /api/menu - 新建菜单项
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<MenuItemCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    let item = state.menu.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT/PATCH /api/menu/:id - 更新菜单项 (只修改提供的字段)
pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MenuItemUpdate>, JsonRejection>,
) -> AppResult<Json<MenuItem>> {
    let id = path_param(id)?;
    let item = state.menu.update(id, json_body(payload)?).await?;
    Ok(Json(item))
}

/// DELETE /api/menu/:id - 删除菜单项
///
/// 被订单引用的菜单项返回 409，应改为下架 (`isActive: false`)
pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<bool>> {
    let id = path_param(id)?;
    state.menu.delete(id).await?;
    Ok(Json(true))
}
