//! Order Repository
//!
//! Orders are always returned hydrated: line items plus the menu item each
//! line refers to.

use std::collections::HashMap;

use super::{RepoError, RepoResult, menu_item};
use crate::db::cents;
use shared::models::{MenuItem, Order, OrderDraft, OrderItem, OrderItemDraft, OrderStatus};
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT_COLUMNS: &str = "SELECT id, order_number, table_number, status, subtotal_cents, \
     tax_cents, total_cents, notes, created_at, updated_at FROM orders";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    table_number: i32,
    status: OrderStatus,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            table_number: self.table_number,
            status: self.status,
            subtotal: cents::to_decimal(self.subtotal_cents),
            tax: cents::to_decimal(self.tax_cents),
            total: cents::to_decimal(self.total_cents),
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
    unit_price_cents: i64,
    total_cents: i64,
}

impl OrderItemRow {
    fn into_item(self, menu_item: Option<MenuItem>) -> OrderItem {
        OrderItem {
            id: self.id,
            order_id: self.order_id,
            menu_item_id: self.menu_item_id,
            quantity: self.quantity,
            unit_price: cents::to_decimal(self.unit_price_cents),
            total_price: cents::to_decimal(self.total_cents),
            menu_item,
        }
    }
}

/// Attach line items and their menu items, preserving the order of `rows`
async fn hydrate(pool: &SqlitePool, rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, order_id, menu_item_id, quantity, unit_price_cents, total_cents \
         FROM order_items WHERE order_id IN (",
    );
    let mut separated = qb.separated(", ");
    for row in &rows {
        separated.push_bind(row.id);
    }
    separated.push_unseparated(") ORDER BY id");
    let item_rows: Vec<OrderItemRow> = qb.build_query_as().fetch_all(pool).await?;

    let mut menu_ids: Vec<i64> = item_rows.iter().map(|i| i.menu_item_id).collect();
    menu_ids.sort_unstable();
    menu_ids.dedup();
    let menu: HashMap<i64, MenuItem> = menu_item::find_by_ids(pool, &menu_ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
        let menu_item = menu.get(&row.menu_item_id).cloned();
        items_by_order
            .entry(row.order_id)
            .or_default()
            .push(row.into_item(menu_item));
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect())
}

/// Newest first, optionally restricted to one status
pub async fn find_all(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE (?1 IS NULL OR status = ?1) \
         ORDER BY created_at DESC, id DESC LIMIT ?2"
    );
    let rows: Vec<OrderRow> = sqlx::query_as(&sql)
        .bind(status)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    hydrate(pool, rows).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    let row: Option<OrderRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(hydrate(pool, row.into_iter().collect()).await?.pop())
}

pub async fn find_by_number(pool: &SqlitePool, order_number: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{SELECT_COLUMNS} WHERE order_number = ?");
    let row: Option<OrderRow> = sqlx::query_as(&sql)
        .bind(order_number)
        .fetch_optional(pool)
        .await?;
    Ok(hydrate(pool, row.into_iter().collect()).await?.pop())
}

/// Current status only, without hydration
pub async fn find_status(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderStatus>> {
    Ok(sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Insert the order and all of its lines in one transaction.
///
/// A duplicate `order_number` surfaces as [`RepoError::Duplicate`] and
/// nothing is written.
pub async fn insert(
    pool: &SqlitePool,
    order_number: &str,
    draft: &OrderDraft,
    items: &[OrderItemDraft],
) -> RepoResult<i64> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO orders (order_number, table_number, status, subtotal_cents, tax_cents, total_cents, notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order_number)
    .bind(draft.table_number)
    .bind(OrderStatus::Pending)
    .bind(cents::from_decimal(draft.subtotal)?)
    .bind(cents::from_decimal(draft.tax)?)
    .bind(cents::from_decimal(draft.total)?)
    .bind(&draft.notes)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let order_id = result.last_insert_rowid();

    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price_cents, total_cents) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(cents::from_decimal(item.unit_price)?)
        .bind(cents::from_decimal(item.total_price)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order_id)
}

/// Compare-and-set on the status column.
///
/// Returns `false` when the row no longer has status `from`.
pub async fn update_status_if(
    pool: &SqlitePool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(to)
    .bind(now_millis())
    .bind(id)
    .bind(from)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Load a freshly written order, treating absence as a store fault
pub async fn reload(pool: &SqlitePool, id: i64) -> RepoResult<Order> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("order {id} vanished after write")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use rust_decimal::Decimal;
    use shared::models::{MenuCategory, MenuItemCreate};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn seed_menu(db: &DbService) -> MenuItem {
        menu_item::create(
            &db.pool,
            &MenuItemCreate {
                name: "Flat White".into(),
                description: None,
                price: dec("3.80"),
                category: MenuCategory::Coffee,
                is_active: None,
                image: None,
            },
        )
        .await
        .unwrap()
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            table_number: 4,
            subtotal: dec("7.60"),
            tax: dec("0.76"),
            total: dec("8.36"),
            notes: Some("oat milk".into()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_hydrate() {
        let db = DbService::in_memory().await.unwrap();
        let coffee = seed_menu(&db).await;
        let lines = vec![OrderItemDraft {
            menu_item_id: coffee.id,
            quantity: 2,
            unit_price: dec("3.80"),
            total_price: dec("7.60"),
        }];

        let id = insert(&db.pool, "ORD-000123", &draft(), &lines).await.unwrap();
        let order = reload(&db.pool, id).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, dec("8.36"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].menu_item.as_ref(), Some(&coffee));

        let by_number = find_by_number(&db.pool, "ORD-000123").await.unwrap();
        assert_eq!(by_number, Some(order));
    }

    #[tokio::test]
    async fn test_failed_line_rolls_back_order() {
        let db = DbService::in_memory().await.unwrap();
        let lines = vec![OrderItemDraft {
            menu_item_id: 424242,
            quantity: 1,
            unit_price: dec("1.00"),
            total_price: dec("1.00"),
        }];

        let result = insert(&db.pool, "ORD-000001", &draft(), &lines).await;
        assert!(matches!(result, Err(RepoError::Conflict(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_order_number() {
        let db = DbService::in_memory().await.unwrap();
        let coffee = seed_menu(&db).await;
        let lines = vec![OrderItemDraft {
            menu_item_id: coffee.id,
            quantity: 1,
            unit_price: dec("3.80"),
            total_price: dec("3.80"),
        }];

        insert(&db.pool, "ORD-000777", &draft(), &lines).await.unwrap();
        assert!(matches!(
            insert(&db.pool, "ORD-000777", &draft(), &lines).await,
            Err(RepoError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_compare_and_set_status() {
        let db = DbService::in_memory().await.unwrap();
        let coffee = seed_menu(&db).await;
        let lines = vec![OrderItemDraft {
            menu_item_id: coffee.id,
            quantity: 1,
            unit_price: dec("3.80"),
            total_price: dec("3.80"),
        }];
        let id = insert(&db.pool, "ORD-000042", &draft(), &lines).await.unwrap();

        assert!(
            update_status_if(&db.pool, id, OrderStatus::Pending, OrderStatus::Preparing)
                .await
                .unwrap()
        );
        // second writer observed the stale status
        assert!(
            !update_status_if(&db.pool, id, OrderStatus::Pending, OrderStatus::Preparing)
                .await
                .unwrap()
        );
        assert_eq!(
            find_status(&db.pool, id).await.unwrap(),
            Some(OrderStatus::Preparing)
        );
    }

    #[tokio::test]
    async fn test_find_all_filters_and_sorts() {
        let db = DbService::in_memory().await.unwrap();
        let coffee = seed_menu(&db).await;
        let lines = vec![OrderItemDraft {
            menu_item_id: coffee.id,
            quantity: 1,
            unit_price: dec("3.80"),
            total_price: dec("3.80"),
        }];
        let first = insert(&db.pool, "ORD-000001", &draft(), &lines).await.unwrap();
        let second = insert(&db.pool, "ORD-000002", &draft(), &lines).await.unwrap();
        update_status_if(&db.pool, first, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();

        let all = find_all(&db.pool, None, 100).await.unwrap();
        assert_eq!(all.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second, first]);

        let pending = find_all(&db.pool, Some(OrderStatus::Pending), 100).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);

        assert_eq!(find_all(&db.pool, None, 1).await.unwrap().len(), 1);
    }
}
