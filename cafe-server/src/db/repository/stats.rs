//! Analytics queries (read-only)

use super::RepoResult;
use crate::db::cents;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::{OrderStats, PopularItem};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_orders: i64,
    pending_orders: i64,
    preparing_orders: i64,
    ready_orders: i64,
    completed_orders: i64,
    cancelled_orders: i64,
    revenue_cents: i64,
}

/// Status counts plus revenue over completed orders
pub async fn order_stats(pool: &SqlitePool) -> RepoResult<OrderStats> {
    let row: StatsRow = sqlx::query_as(
        "SELECT \
            COUNT(*) AS total_orders, \
            COALESCE(SUM(status = 'pending'), 0) AS pending_orders, \
            COALESCE(SUM(status = 'preparing'), 0) AS preparing_orders, \
            COALESCE(SUM(status = 'ready'), 0) AS ready_orders, \
            COALESCE(SUM(status = 'completed'), 0) AS completed_orders, \
            COALESCE(SUM(status = 'cancelled'), 0) AS cancelled_orders, \
            COALESCE(SUM(CASE WHEN status = 'completed' THEN total_cents ELSE 0 END), 0) AS revenue_cents \
         FROM orders",
    )
    .fetch_one(pool)
    .await?;

    let revenue = cents::to_decimal(row.revenue_cents);
    let mut average_order_value = if row.completed_orders > 0 {
        (revenue / Decimal::from(row.completed_orders))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };
    average_order_value.rescale(2);

    Ok(OrderStats {
        total_orders: row.total_orders,
        pending_orders: row.pending_orders,
        preparing_orders: row.preparing_orders,
        ready_orders: row.ready_orders,
        completed_orders: row.completed_orders,
        cancelled_orders: row.cancelled_orders,
        revenue,
        average_order_value,
    })
}

#[derive(sqlx::FromRow)]
struct PopularRow {
    menu_item_id: i64,
    name: String,
    quantity_sold: i64,
    revenue_cents: i64,
}

/// Best sellers by quantity, cancelled orders excluded
pub async fn popular_items(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<PopularItem>> {
    let rows: Vec<PopularRow> = sqlx::query_as(
        "SELECT oi.menu_item_id, m.name, \
                SUM(oi.quantity) AS quantity_sold, \
                SUM(oi.total_cents) AS revenue_cents \
         FROM order_items oi \
         JOIN orders o ON o.id = oi.order_id \
         JOIN menu_items m ON m.id = oi.menu_item_id \
         WHERE o.status != 'cancelled' \
         GROUP BY oi.menu_item_id, m.name \
         ORDER BY quantity_sold DESC, revenue_cents DESC, oi.menu_item_id \
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| PopularItem {
            menu_item_id: r.menu_item_id,
            name: r.name,
            quantity_sold: r.quantity_sold,
            revenue: cents::to_decimal(r.revenue_cents),
        })
        .collect())
}
