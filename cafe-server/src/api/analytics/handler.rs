//! Analytics API Handlers

use axum::{
    Json,
    extract::rejection::QueryRejection,
    extract::{Query, State},
};
use shared::models::{OrderStats, PopularItem, PopularItemsQuery};

use crate::api::query_params;
use crate::core::ServerState;
use crate::db::repository::stats as stats_repo;
use crate::utils::AppResult;

const DEFAULT_POPULAR_LIMIT: i64 = 10;
const MAX_POPULAR_LIMIT: i64 = 100;

/// GET /api/analytics/stats - 订单统计
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<OrderStats>> {
    let stats = stats_repo::order_stats(state.pool()).await?;
    Ok(Json(stats))
}

/// GET /api/analytics/popular-items - 热销菜品 (?limit=)
pub async fn popular_items(
    State(state): State<ServerState>,
    query: Result<Query<PopularItemsQuery>, QueryRejection>,
) -> AppResult<Json<Vec<PopularItem>>> {
    let query = query_params(query)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_POPULAR_LIMIT)
        .clamp(1, MAX_POPULAR_LIMIT);

    let items = stats_repo::popular_items(state.pool(), limit).await?;
    Ok(Json(items))
}
