mod common;

use cafe_server::db::repository::menu_item;
use common::{TestApp, dec};
use http::StatusCode;
use shared::models::{
    MenuCategory, MenuItemCreate, OrderDraft, OrderItemDraft, OrderStatus, Role,
};

async fn place(app: &TestApp, price: &str) -> i64 {
    let item = menu_item::create(
        app.state.pool(),
        &MenuItemCreate {
            name: format!("Special {price}"),
            description: None,
            price: dec(price),
            category: MenuCategory::Desserts,
            is_active: None,
            image: None,
        },
    )
    .await
    .unwrap();

    let order = app
        .state
        .orders
        .create_order(
            OrderDraft {
                table_number: 4,
                subtotal: dec(price),
                tax: dec("0"),
                total: dec(price),
                notes: None,
            },
            vec![OrderItemDraft {
                menu_item_id: item.id,
                quantity: 1,
                unit_price: dec(price),
                total_price: dec(price),
            }],
        )
        .await
        .unwrap();
    order.id
}

async fn complete(app: &TestApp, id: i64) {
    for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
        app.state.orders.update_order_status(id, status).await.unwrap();
    }
}

#[tokio::test]
async fn revenue_counts_only_completed_orders() {
    let app = TestApp::new().await;
    let staff = app.token_for("barista", Role::Staff).await;

    for price in ["10.00", "15.50", "7.25"] {
        let id = place(&app, price).await;
        complete(&app, id).await;
    }
    place(&app, "4.00").await;
    place(&app, "6.00").await;

    let (status, stats) = app
        .send("GET", "/api/analytics/stats", Some(&staff), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalOrders"], 5);
    assert_eq!(stats["pendingOrders"], 2);
    assert_eq!(stats["completedOrders"], 3);
    assert_eq!(stats["revenue"], "32.75");
    assert_eq!(stats["averageOrderValue"], "10.92");
}

#[tokio::test]
async fn popular_items_respects_limit() {
    let app = TestApp::new().await;
    let staff = app.token_for("barista", Role::Staff).await;
    place(&app, "2.00").await;
    place(&app, "3.00").await;

    let (status, items) = app
        .send("GET", "/api/analytics/popular-items?limit=1", Some(&staff), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);

    let (status, _) = app.send("GET", "/api/analytics/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
