//! Menu Item Repository

use super::{RepoError, RepoResult};
use crate::db::cents;
use shared::models::{MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate, MenuQuery};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT_COLUMNS: &str = "SELECT id, name, description, price_cents, category, is_active, \
     image, created_at, updated_at FROM menu_items";

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    price_cents: i64,
    category: MenuCategory,
    is_active: bool,
    image: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: cents::to_decimal(row.price_cents),
            category: row.category,
            is_active: row.is_active,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// List items, optionally filtered by category and active flag
pub async fn find_all(pool: &SqlitePool, query: &MenuQuery) -> RepoResult<Vec<MenuItem>> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE (?1 IS NULL OR category = ?1) AND (?2 = 0 OR is_active = 1) \
         ORDER BY category, name, id"
    );
    let rows: Vec<MenuItemRow> = sqlx::query_as(&sql)
        .bind(query.category)
        .bind(query.active_only.unwrap_or(false))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(MenuItem::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    let row: Option<MenuItemRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.map(MenuItem::from))
}

/// Batch lookup, missing ids are simply absent from the result
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
    qb.push(" WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows: Vec<MenuItemRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(MenuItem::from).collect())
}

pub async fn create(pool: &SqlitePool, data: &MenuItemCreate) -> RepoResult<MenuItem> {
    let now = now_millis();
    let result = sqlx::query(
        "INSERT INTO menu_items (name, description, price_cents, category, is_active, image, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(cents::from_decimal(data.price)?)
    .bind(data.category)
    .bind(data.is_active.unwrap_or(true))
    .bind(&data.image)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("menu item {id} vanished after insert")))
}

/// Partial update, absent fields keep their stored value
pub async fn update(pool: &SqlitePool, id: i64, data: &MenuItemUpdate) -> RepoResult<MenuItem> {
    let price_cents = data.price.map(cents::from_decimal).transpose()?;

    let result = sqlx::query(
        "UPDATE menu_items SET \
            name = COALESCE(?, name), \
            description = COALESCE(?, description), \
            price_cents = COALESCE(?, price_cents), \
            category = COALESCE(?, category), \
            is_active = COALESCE(?, is_active), \
            image = COALESCE(?, image), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(price_cents)
    .bind(data.category)
    .bind(data.is_active)
    .bind(&data.image)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("menu item {id}")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("menu item {id}")))
}

/// Number of order lines pointing at this item
pub async fn reference_count(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE menu_item_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Hard delete. Referenced items are refused with [`RepoError::Conflict`].
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let references = reference_count(pool, id).await?;
    if references > 0 {
        return Err(RepoError::Conflict(format!(
            "menu item {id} is referenced by {references} order item(s)"
        )));
    }

    // ON DELETE RESTRICT still guards an order placed in between
    let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("menu item {id}")));
    }
    Ok(())
}
