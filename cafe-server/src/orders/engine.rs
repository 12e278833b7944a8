//! Order Engine
//!
//! 订单创建、查询和状态流转。每次写入成功后向 [`Broadcaster`] 发布事件。

use std::collections::HashMap;

use shared::message::CafeEvent;
use shared::models::{CreateOrderRequest, Order, OrderDraft, OrderItemDraft, OrderStatus};
use sqlx::SqlitePool;

use super::{OrderError, cart, number, transition};
use crate::db::repository::{RepoError, menu_item, order as order_repo};
use crate::live::Broadcaster;

/// Default page size for order listings
pub const DEFAULT_LIST_LIMIT: i64 = 100;
/// Upper bound for `?limit=`
pub const MAX_LIST_LIMIT: i64 = 500;
/// Attempts at finding a free order number
pub const MAX_NUMBER_ATTEMPTS: u32 = 5;

#[derive(Clone, Debug)]
pub struct OrderEngine {
    pool: SqlitePool,
    broadcaster: Broadcaster,
}

impl OrderEngine {
    pub fn new(pool: SqlitePool, broadcaster: Broadcaster) -> Self {
        Self { pool, broadcaster }
    }

    /// Parse a customer cart and create the order
    pub async fn create_from_request(&self, request: &CreateOrderRequest) -> Result<Order, OrderError> {
        let (draft, items) = cart::parse_request(request)?;
        self.create_order(draft, items).await
    }

    /// Validate, reconcile totals, persist atomically and announce
    pub async fn create_order(
        &self,
        draft: OrderDraft,
        items: Vec<OrderItemDraft>,
    ) -> Result<Order, OrderError> {
        cart::validate_drafts(&draft, &items)?;

        let mut ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let menu: HashMap<_, _> = menu_item::find_by_ids(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let (draft, items) = cart::reconcile_totals(&draft, &items, &menu)?;

        let order_id = self.insert_with_fresh_number(&draft, &items).await?;
        let order = order_repo::reload(&self.pool, order_id).await?;

        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            table_number = order.table_number,
            items = order.item_count(),
            total = %order.total,
            "Order created"
        );

        self.broadcaster
            .broadcast(&CafeEvent::OrderCreated(Box::new(order.clone())));
        Ok(order)
    }

    async fn insert_with_fresh_number(
        &self,
        draft: &OrderDraft,
        items: &[OrderItemDraft],
    ) -> Result<i64, OrderError> {
        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let order_number = number::next_order_number();
            match order_repo::insert(&self.pool, &order_number, draft, items).await {
                Ok(id) => return Ok(id),
                // order_number is the only UNIQUE column on orders
                Err(RepoError::Duplicate(_)) => {
                    tracing::warn!(%order_number, attempt, "Order number taken, retrying");
                }
                Err(RepoError::Conflict(msg)) => {
                    // a referenced menu item was deleted after reconciliation
                    return Err(OrderError::invalid("items", msg));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(OrderError::NumberConflict(MAX_NUMBER_ATTEMPTS))
    }

    /// All orders, newest first
    pub async fn get_orders(&self, limit: Option<i64>) -> Result<Vec<Order>, OrderError> {
        Ok(order_repo::find_all(&self.pool, None, clamp_limit(limit)).await?)
    }

    /// Orders in one status, newest first
    pub async fn get_orders_by_status(
        &self,
        status: OrderStatus,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(order_repo::find_all(&self.pool, Some(status), clamp_limit(limit)).await?)
    }

    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, OrderError> {
        Ok(order_repo::find_by_id(&self.pool, id).await?)
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> Result<Option<Order>, OrderError> {
        Ok(order_repo::find_by_number(&self.pool, order_number.trim()).await?)
    }

    /// Move an order along the status chain.
    ///
    /// The write only succeeds if the status is still the one the check was
    /// made against. Losing that race reports the transition as illegal
    /// from the status that won, and nothing is broadcast.
    pub async fn update_order_status(
        &self,
        id: i64,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let current = order_repo::find_status(&self.pool, id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        transition::ensure_transition(current, new_status)?;

        if !order_repo::update_status_if(&self.pool, id, current, new_status).await? {
            let observed = order_repo::find_status(&self.pool, id)
                .await?
                .ok_or(OrderError::NotFound(id))?;
            tracing::warn!(
                order_id = id,
                expected = %current,
                observed = %observed,
                requested = %new_status,
                "Concurrent status change, update rejected"
            );
            return Err(OrderError::IllegalTransition {
                from: observed,
                to: new_status,
            });
        }

        let order = order_repo::reload(&self.pool, id).await?;
        tracing::info!(
            order_id = id,
            order_number = %order.order_number,
            from = %current,
            to = %new_status,
            "Order status updated"
        );

        self.broadcaster
            .broadcast(&CafeEvent::OrderStatusUpdated(Box::new(order.clone())));
        Ok(order)
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::live::Subscription;
    use rust_decimal::Decimal;
    use shared::models::{MenuCategory, MenuItemCreate};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn setup() -> (OrderEngine, Broadcaster, i64) {
        let db = DbService::in_memory().await.unwrap();
        let item = menu_item::create(
            &db.pool,
            &MenuItemCreate {
                name: "Cortado".into(),
                description: None,
                price: dec("3.20"),
                category: MenuCategory::Coffee,
                is_active: None,
                image: None,
            },
        )
        .await
        .unwrap();
        let broadcaster = Broadcaster::new(16);
        (
            OrderEngine::new(db.pool, broadcaster.clone()),
            broadcaster,
            item.id,
        )
    }

    fn cart(menu_item_id: i64) -> (OrderDraft, Vec<OrderItemDraft>) {
        (
            OrderDraft {
                table_number: 2,
                subtotal: dec("6.40"),
                tax: dec("0.64"),
                total: dec("7.04"),
                notes: None,
            },
            vec![OrderItemDraft {
                menu_item_id,
                quantity: 2,
                unit_price: dec("3.20"),
                total_price: dec("6.40"),
            }],
        )
    }

    #[tokio::test]
    async fn test_create_broadcasts_order_created() {
        let (engine, broadcaster, item) = setup().await;
        let (_, mut rx) = broadcaster.register(Subscription::All);

        let (draft, items) = cart(item);
        let order = engine.create_order(draft, items).await.unwrap();
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.items_total(), order.subtotal);

        let event: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(event["type"], "ORDER_CREATED");
        assert_eq!(event["data"]["id"], order.id);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIST_LIMIT);
    }

    #[tokio::test]
    async fn test_illegal_transition_does_not_broadcast() {
        let (engine, broadcaster, item) = setup().await;
        let (draft, items) = cart(item);
        let order = engine.create_order(draft, items).await.unwrap();

        let (_, mut rx) = broadcaster.register(Subscription::All);
        let err = engine
            .update_order_status(order.id, OrderStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));
        assert!(rx.try_recv().is_err());

        let unchanged = engine.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (engine, _, _) = setup().await;
        assert!(matches!(
            engine.update_order_status(77, OrderStatus::Preparing).await,
            Err(OrderError::NotFound(77))
        ));
        assert_eq!(engine.get_order(77).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_racing_transitions_single_winner() {
        let (engine, broadcaster, item) = setup().await;
        let (draft, items) = cart(item);
        let order = engine.create_order(draft, items).await.unwrap();
        let (_, mut rx) = broadcaster.register(Subscription::All);

        let (a, b) = tokio::join!(
            engine.update_order_status(order.id, OrderStatus::Preparing),
            engine.update_order_status(order.id, OrderStatus::Preparing),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }
}
