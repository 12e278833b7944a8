//! Order API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::ErrorCode;
use shared::models::{CreateOrderRequest, Order, OrderQuery, OrderStatusUpdate};

use crate::api::{json_body, path_param, query_params};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::OrderError;
use crate::utils::{AppError, AppResult};

/// POST /api/orders - 顾客提交购物车
///
/// 返回完整订单 (含明细和菜单项)，并广播 `ORDER_CREATED`
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let request = json_body(payload)?;
    let order = state.orders.create_from_request(&request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/number/:order_number - 顾客查询订单进度
pub async fn get_by_number(
    State(state): State<ServerState>,
    order_number: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Order>> {
    let order_number = path_param(order_number)?;
    let order = state
        .orders
        .get_order_by_number(&order_number)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order {order_number} not found"),
            )
            .with_detail("orderNumber", order_number.clone())
        })?;
    Ok(Json(order))
}

/// GET /api/orders - 订单列表 (?status=&limit=)，最新在前
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Order>>> {
    let query = query_params(query)?;
    let orders = match query.status {
        Some(status) => state.orders.get_orders_by_status(status, query.limit).await?,
        None => state.orders.get_orders(query.limit).await?,
    };
    Ok(Json(orders))
}

/// GET /api/orders/:id - 单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Order>> {
    let id = path_param(id)?;
    let order = state
        .orders
        .get_order(id)
        .await?
        .ok_or(OrderError::NotFound(id))?;
    Ok(Json(order))
}

/// PATCH /api/orders/:id/status - 推进或取消订单
pub async fn update_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderStatusUpdate>, JsonRejection>,
) -> AppResult<Json<Order>> {
    let id = path_param(id)?;
    let payload = json_body(payload)?;
    let order = state.orders.update_order_status(id, payload.status).await?;

    tracing::debug!(
        order_id = id,
        status = %order.status,
        operator = %current_user.username,
        "Order status changed via API"
    );
    Ok(Json(order))
}
