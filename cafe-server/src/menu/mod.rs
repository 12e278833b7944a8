//! Menu Catalog
//!
//! 菜单项的查询与维护。写操作成功后广播 `MENU_ITEM_*` 事件。

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{CafeEvent, DeletedRef};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuQuery};
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, menu_item};
use crate::live::Broadcaster;
use crate::orders::cart::MAX_AMOUNT;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, limit_text, require_text};

#[derive(Clone, Debug)]
pub struct MenuCatalog {
    pool: SqlitePool,
    broadcaster: Broadcaster,
}

impl MenuCatalog {
    pub fn new(pool: SqlitePool, broadcaster: Broadcaster) -> Self {
        Self { pool, broadcaster }
    }

    pub async fn list(&self, query: &MenuQuery) -> AppResult<Vec<MenuItem>> {
        Ok(menu_item::find_all(&self.pool, query).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<MenuItem> {
        menu_item::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, data: MenuItemCreate) -> AppResult<MenuItem> {
        require_text(&data.name, "name", MAX_NAME_LEN)?;
        limit_text(data.description.as_deref(), "description", MAX_NOTE_LEN)?;
        limit_text(data.image.as_deref(), "image", MAX_URL_LEN)?;
        validate_price(data.price)?;

        let item = menu_item::create(&self.pool, &data).await?;
        tracing::info!(menu_item_id = item.id, name = %item.name, price = %item.price, "Menu item created");

        self.broadcaster
            .broadcast(&CafeEvent::MenuItemAdded(item.clone()));
        Ok(item)
    }

    pub async fn update(&self, id: i64, data: MenuItemUpdate) -> AppResult<MenuItem> {
        if let Some(name) = &data.name {
            require_text(name, "name", MAX_NAME_LEN)?;
        }
        limit_text(data.description.as_deref(), "description", MAX_NOTE_LEN)?;
        limit_text(data.image.as_deref(), "image", MAX_URL_LEN)?;
        if let Some(price) = data.price {
            validate_price(price)?;
        }

        let item = menu_item::update(&self.pool, id, &data)
            .await
            .map_err(|e| map_repo_error(id, e))?;
        tracing::info!(menu_item_id = id, "Menu item updated");

        self.broadcaster
            .broadcast(&CafeEvent::MenuItemUpdated(item.clone()));
        Ok(item)
    }

    /// Hard delete; items that appear on any order must be deactivated instead
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        menu_item::delete(&self.pool, id)
            .await
            .map_err(|e| map_repo_error(id, e))?;
        tracing::info!(menu_item_id = id, "Menu item deleted");

        self.broadcaster
            .broadcast(&CafeEvent::MenuItemDeleted(DeletedRef { id }));
        Ok(())
    }
}

fn validate_price(price: Decimal) -> AppResult<()> {
    let problem = if price.is_sign_negative() && !price.is_zero() {
        Some("price must not be negative")
    } else if price.normalize().scale() > 2 {
        Some("price has more than two decimal places")
    } else if price > MAX_AMOUNT {
        Some("price is too large")
    } else {
        None
    };

    match problem {
        Some(msg) => Err(AppError::with_message(ErrorCode::MenuItemInvalidPrice, msg)
            .with_detail("field", "price")),
        None => Ok(()),
    }
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        .with_detail("menuItemId", id)
}

fn map_repo_error(id: i64, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => not_found(id),
        RepoError::Conflict(_) => AppError::with_message(
            ErrorCode::MenuItemInUse,
            format!("Menu item {id} is referenced by existing orders; deactivate it instead"),
        )
        .with_detail("menuItemId", id),
        other => other.into(),
    }
}
