//! Dining Table API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatusUpdate};

use crate::api::{json_body, path_param};
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/tables/qr/:qr_code - 扫码解析桌台
pub async fn get_by_qr(
    State(state): State<ServerState>,
    qr_code: Result<Path<String>, PathRejection>,
) -> AppResult<Json<DiningTable>> {
    let qr_code = path_param(qr_code)?;
    let table = state.tables.find_by_qr(&qr_code).await?;
    Ok(Json(table))
}

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.tables.list().await?;
    Ok(Json(tables))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<DiningTable>> {
    let id = path_param(id)?;
    let table = state.tables.get(id).await?;
    Ok(Json(table))
}

/// PATCH /api/tables/:id/status - 设置桌台状态
pub async fn update_status(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TableStatusUpdate>, JsonRejection>,
) -> AppResult<Json<DiningTable>> {
    let id = path_param(id)?;
    let payload = json_body(payload)?;
    let table = state.tables.set_status(id, payload.status).await?;
    Ok(Json(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<DiningTableCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    let table = state.tables.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /api/tables/:id - 更新桌台容量
pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DiningTableUpdate>, JsonRejection>,
) -> AppResult<Json<DiningTable>> {
    let id = path_param(id)?;
    let table = state.tables.update(id, json_body(payload)?).await?;
    Ok(Json(table))
}

/// DELETE /api/tables/:id - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<bool>> {
    let id = path_param(id)?;
    state.tables.delete(id).await?;
    Ok(Json(true))
}
