//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::str::FromStr;

use axum::Router;
use axum::body::Body;
use cafe_server::auth::password::hash_password;
use cafe_server::db::DbService;
use cafe_server::db::repository::{menu_item, user};
use cafe_server::{Config, ServerState};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::models::{MenuCategory, MenuItem, MenuItemCreate, Role};
use tower::ServiceExt;

pub struct TestApp {
    pub state: ServerState,
    pub latte: MenuItem,
    pub croissant: MenuItem,
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.unwrap();
        let state = ServerState::new(Config::for_tests(), db);

        let latte = seed_item(&state, "Latte", "4.50", MenuCategory::Coffee).await;
        let croissant = seed_item(&state, "Croissant", "3.25", MenuCategory::Food).await;

        Self {
            state,
            latte,
            croissant,
        }
    }

    pub fn router(&self) -> Router {
        cafe_server::api::build_router(self.state.clone())
    }

    /// Create an account and mint a token for it
    pub async fn token_for(&self, username: &str, role: Role) -> String {
        let hash = hash_password("correct-horse-battery").unwrap();
        let account = user::create(self.state.pool(), username, &hash, role)
            .await
            .unwrap();
        self.state
            .get_jwt_service()
            .generate_token(account.id, &account.username, role)
            .unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

async fn seed_item(state: &ServerState, name: &str, price: &str, category: MenuCategory) -> MenuItem {
    menu_item::create(
        state.pool(),
        &MenuItemCreate {
            name: name.into(),
            description: None,
            price: dec(price),
            category,
            is_active: None,
            image: None,
        },
    )
    .await
    .unwrap()
}

/// A cart of `quantity` units of one item, with 10% tax
pub fn cart_body(table_number: i64, item: &MenuItem, quantity: i64) -> Value {
    let line = item.price * Decimal::from(quantity);
    let tax = (line / Decimal::from(10)).round_dp(2);
    json!({
        "order": {
            "tableNumber": table_number,
            "subtotal": line.to_string(),
            "tax": tax.to_string(),
            "total": (line + tax).to_string(),
        },
        "items": [{
            "menuItemId": item.id,
            "quantity": quantity,
            "unitPrice": item.price.to_string(),
            "totalPrice": line.to_string(),
        }]
    })
}
