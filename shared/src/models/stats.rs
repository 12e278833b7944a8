//! Analytics Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GET /api/analytics/stats response
///
/// `revenue` only counts completed orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub preparing_orders: i64,
    pub ready_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub revenue: Decimal,
    /// revenue / completed_orders, zero when nothing is completed
    pub average_order_value: Decimal,
}

/// Best sellers by quantity, cancelled orders excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// Popular items filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopularItemsQuery {
    pub limit: Option<i64>,
}
