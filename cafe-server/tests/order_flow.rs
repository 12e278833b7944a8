//! Engine-level order lifecycle

mod common;

use std::collections::HashSet;

use cafe_server::orders::OrderError;
use common::{TestApp, dec};
use shared::models::{OrderDraft, OrderItemDraft, OrderStatus};

fn latte_cart(app: &TestApp, table_number: i32) -> (OrderDraft, Vec<OrderItemDraft>) {
    (
        OrderDraft {
            table_number,
            subtotal: dec("9.00"),
            tax: dec("0.90"),
            total: dec("9.90"),
            notes: Some("oat milk".into()),
        },
        vec![OrderItemDraft {
            menu_item_id: app.latte.id,
            quantity: 2,
            unit_price: dec("4.50"),
            total_price: dec("9.00"),
        }],
    )
}

#[tokio::test]
async fn created_order_round_trips() {
    let app = TestApp::new().await;
    let (draft, items) = latte_cart(&app, 7);

    let created = app.state.orders.create_order(draft, items).await.unwrap();
    let fetched = app
        .state
        .orders
        .get_order_by_number(&created.order_number)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.table_number, 7);
    assert_eq!(fetched.total, dec("9.90"));
    assert_eq!(fetched.notes.as_deref(), Some("oat milk"));
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].quantity, 2);
    assert_eq!(fetched.status, OrderStatus::Pending);
}

#[tokio::test]
async fn illegal_transitions_leave_status_unchanged() {
    let app = TestApp::new().await;
    let (draft, items) = latte_cart(&app, 1);
    let order = app.state.orders.create_order(draft, items).await.unwrap();

    let err = app
        .state
        .orders
        .update_order_status(order.id, OrderStatus::Ready)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::IllegalTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Ready
        }
    ));

    let cancelled = app
        .state
        .orders
        .update_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // cancelled is terminal
    assert!(
        app.state
            .orders
            .update_order_status(order.id, OrderStatus::Preparing)
            .await
            .is_err()
    );
    let reloaded = app.state.orders.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn rapid_orders_get_distinct_numbers() {
    let app = TestApp::new().await;

    let mut handles = Vec::new();
    for table in 1..=20 {
        let engine = app.state.orders.clone();
        let (draft, items) = latte_cart(&app, table);
        handles.push(tokio::spawn(async move {
            engine.create_order(draft, items).await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let order = handle.await.unwrap().unwrap();
        assert!(numbers.insert(order.order_number));
    }
    assert_eq!(numbers.len(), 20);
}

#[tokio::test]
async fn unknown_order_is_none() {
    let app = TestApp::new().await;
    assert!(app.state.orders.get_order(999).await.unwrap().is_none());
    assert!(
        app.state
            .orders
            .get_order_by_number("ORD-000000")
            .await
            .unwrap()
            .is_none()
    );
}
