//! User API 模块 (管理员)

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::{ADMIN_ROLES, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_roles(ADMIN_ROLES)))
}
