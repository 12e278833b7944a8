//! 实时事件类型定义
//!
//! 服务器通过 `/ws` 推送给所有订阅者的事件。每条消息是
//! `{"type": "...", "data": ...}` 形式的 JSON。推送只是缓存失效提示，
//! 客户端收到后应重新拉取权威数据。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{DiningTable, MenuItem, Order};

/// Payload of `MENU_ITEM_DELETED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRef {
    pub id: i64,
}

/// Real-time event taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CafeEvent {
    OrderCreated(Box<Order>),
    OrderStatusUpdated(Box<Order>),
    MenuItemAdded(MenuItem),
    MenuItemUpdated(MenuItem),
    MenuItemDeleted(DeletedRef),
    TableStatusUpdated(DiningTable),
}

impl CafeEvent {
    /// Wire name of the event (`ORDER_CREATED`, ...)
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OrderCreated(_) => "ORDER_CREATED",
            Self::OrderStatusUpdated(_) => "ORDER_STATUS_UPDATED",
            Self::MenuItemAdded(_) => "MENU_ITEM_ADDED",
            Self::MenuItemUpdated(_) => "MENU_ITEM_UPDATED",
            Self::MenuItemDeleted(_) => "MENU_ITEM_DELETED",
            Self::TableStatusUpdated(_) => "TABLE_STATUS_UPDATED",
        }
    }

    /// Topics this event is published on
    pub fn topics(&self) -> Vec<Topic> {
        match self {
            Self::OrderCreated(order) | Self::OrderStatusUpdated(order) => {
                vec![Topic::StaffOrders, Topic::Order(order.id)]
            }
            Self::MenuItemAdded(_) | Self::MenuItemUpdated(_) | Self::MenuItemDeleted(_) => {
                vec![Topic::Menu]
            }
            Self::TableStatusUpdated(_) => vec![Topic::Tables],
        }
    }
}

/// Subscription key
///
/// | Topic | Wire form |
/// |-------|-----------|
/// | all order events (staff dashboards) | `orders:staff` |
/// | one order (customer tracking) | `order:{id}` |
/// | menu changes | `menu` |
/// | table changes | `tables` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    StaffOrders,
    Order(i64),
    Menu,
    Tables,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::StaffOrders => write!(f, "orders:staff"),
            Topic::Order(id) => write!(f, "order:{id}"),
            Topic::Menu => write!(f, "menu"),
            Topic::Tables => write!(f, "tables"),
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "orders:staff" => Ok(Topic::StaffOrders),
            "menu" => Ok(Topic::Menu),
            "tables" => Ok(Topic::Tables),
            other => other
                .strip_prefix("order:")
                .and_then(|id| id.parse().ok())
                .map(Topic::Order)
                .ok_or_else(|| format!("unknown topic: {other}")),
        }
    }
}
