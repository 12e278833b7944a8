//! Dining Table API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{ADMIN_ROLES, STAFF_ROLES, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    // 扫码解析桌台
    let public_routes = Router::new().route("/qr/{qr_code}", get(handler::get_by_qr));

    let staff_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_roles(STAFF_ROLES)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_roles(ADMIN_ROLES)));

    public_routes.merge(staff_routes).merge(manage_routes)
}
