//! Menu API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{STAFF_ROLES, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    // 顾客浏览菜单无需登录
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update)
                .patch(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_roles(STAFF_ROLES)));

    public_routes.merge(manage_routes)
}
