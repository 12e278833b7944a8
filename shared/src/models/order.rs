//! Order Model
//!
//! Orders, their line items, and the status state machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::menu_item::MenuItem;

/// Order status
///
/// ```text
/// pending ──▶ preparing ──▶ ready ──▶ completed
///    │            │           │
///    └────────────┴───────────┴──▶ cancelled
/// ```
///
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Preparing,
        Self::Ready,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Non-terminal statuses (the kitchen still owes something)
    pub const ACTIVE: [OrderStatus; 3] = [Self::Pending, Self::Preparing, Self::Ready];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// The single canonical forward step, `None` for terminal states
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Completed),
            Self::Completed | Self::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether `self -> target` is a legal transition.
    ///
    /// Legal moves are the canonical next step, or cancellation from any
    /// non-terminal state. Self-transitions are illegal.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Cancelled || self.next() == Some(target)
    }

    /// Position on the customer progress indicator (0..=3), `None` when cancelled
    pub fn progress_step(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Preparing => Some(1),
            Self::Ready => Some(2),
            Self::Completed => Some(3),
            Self::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Hydrated order with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Human-readable number, `ORD-` + 6 digits
    pub order_number: String,
    /// Snapshot of the table number, not a reference to a table row
    pub table_number: i32,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of persisted line totals
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|i| i.total_price).sum()
    }
}

/// Order line item with price snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Price per unit at order time
    pub unit_price: Decimal,
    pub total_price: Decimal,
    /// The referenced menu item as it is now
    pub menu_item: Option<MenuItem>,
}

// =============================================================================
// Create order
// =============================================================================

/// A decimal amount as submitted by a client: either a JSON string
/// (`"10.50"`) or a JSON number (`10.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    /// Raw textual form, used for parsing and error messages
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Order header as submitted by the customer cart
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a field-level validation error instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub table_number: Option<i64>,
    pub subtotal: Option<AmountInput>,
    pub tax: Option<AmountInput>,
    pub total: Option<AmountInput>,
    pub notes: Option<String>,
}

/// Cart line as submitted by the customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub menu_item_id: Option<i64>,
    pub quantity: Option<i64>,
    pub unit_price: Option<AmountInput>,
    pub total_price: Option<AmountInput>,
}

/// POST /api/orders body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order: OrderInput,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// Validated order header
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub table_number: i32,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
}

/// Validated cart line
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemDraft {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// PATCH /api/orders/{id}/status body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Order listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_chain() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Preparing.next(), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::Ready.next(), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::Completed.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;

        // Exhaustive: exactly the forward step and cancellation from active states
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = matches!(
                    (from, to),
                    (Pending, Preparing)
                        | (Preparing, Ready)
                        | (Ready, Completed)
                        | (Pending, Cancelled)
                        | (Preparing, Cancelled)
                        | (Ready, Cancelled)
                );
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} should be {expected}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        for st in OrderStatus::ACTIVE {
            assert!(st.is_active());
        }
    }

    #[test]
    fn test_progress_step() {
        assert_eq!(OrderStatus::Pending.progress_step(), Some(0));
        assert_eq!(OrderStatus::Completed.progress_step(), Some(3));
        assert_eq!(OrderStatus::Cancelled.progress_step(), None);
    }

    #[test]
    fn test_create_request_parses_mixed_amounts() {
        let body = r#"{
            "order": {"tableNumber": 4, "subtotal": "9.00", "tax": 0.9, "total": "9.90"},
            "items": [{"menuItemId": 1, "quantity": 2, "unitPrice": "4.50", "totalPrice": 9}]
        }"#;
        let req: CreateOrderRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.order.table_number, Some(4));
        assert_eq!(req.order.subtotal, Some(AmountInput::from("9.00")));
        assert_eq!(req.order.tax.as_ref().map(AmountInput::as_text), Some("0.9".into()));
        assert_eq!(req.items.len(), 1);
        assert_eq!(
            req.items[0].total_price.as_ref().map(AmountInput::as_text),
            Some("9".into())
        );
    }

    #[test]
    fn test_status_update_rejects_unknown_status() {
        assert!(serde_json::from_str::<OrderStatusUpdate>(r#"{"status":"served"}"#).is_err());
        let ok: OrderStatusUpdate = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
        assert_eq!(ok.status, OrderStatus::Ready);
    }
}
