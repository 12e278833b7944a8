//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{STAFF_ROLES, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 顾客下单和按订单号查询进度
    let customer_routes = Router::new()
        .route("/", post(handler::create))
        .route("/number/{order_number}", get(handler::get_by_number));

    let staff_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_roles(STAFF_ROLES)));

    customer_routes.merge(staff_routes)
}
