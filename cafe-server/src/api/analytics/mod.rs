//! Analytics API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{STAFF_ROLES, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/analytics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/stats", get(handler::stats))
        .route("/popular-items", get(handler::popular_items))
        .layer(middleware::from_fn(require_roles(STAFF_ROLES)))
}
