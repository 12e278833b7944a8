//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, TableStatus, table_qr_code};
use shared::util::now_millis;
use sqlx::SqlitePool;

/// `has_active_orders` is derived from non-terminal orders with the same
/// table number; it is never stored.
const SELECT_COLUMNS: &str = "SELECT t.id, t.table_number, t.capacity, t.status, t.qr_code, \
     EXISTS (SELECT 1 FROM orders o WHERE o.table_number = t.table_number \
             AND o.status IN ('pending', 'preparing', 'ready')) AS has_active_orders, \
     t.created_at, t.updated_at \
     FROM dining_tables t";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY t.table_number");
    Ok(sqlx::query_as(&sql).fetch_all(pool).await?)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{SELECT_COLUMNS} WHERE t.id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn find_by_qr(pool: &SqlitePool, qr_code: &str) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{SELECT_COLUMNS} WHERE t.qr_code = ?");
    Ok(sqlx::query_as(&sql).bind(qr_code).fetch_optional(pool).await?)
}

pub async fn create(
    pool: &SqlitePool,
    table_number: i32,
    capacity: i32,
    status: TableStatus,
) -> RepoResult<DiningTable> {
    let now = now_millis();
    let result = sqlx::query(
        "INSERT INTO dining_tables (table_number, capacity, status, qr_code, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(table_number)
    .bind(capacity)
    .bind(status)
    .bind(table_qr_code(table_number))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("table {id} vanished after insert")))
}

pub async fn update_capacity(pool: &SqlitePool, id: i64, capacity: i32) -> RepoResult<DiningTable> {
    let result = sqlx::query("UPDATE dining_tables SET capacity = ?, updated_at = ? WHERE id = ?")
        .bind(capacity)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    reload_if_affected(pool, id, result.rows_affected()).await
}

pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: TableStatus,
) -> RepoResult<DiningTable> {
    let result = sqlx::query("UPDATE dining_tables SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    reload_if_affected(pool, id, result.rows_affected()).await
}

/// Orders keep their table number snapshot, nothing cascades
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM dining_tables WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("table {id}")));
    }
    Ok(())
}

async fn reload_if_affected(pool: &SqlitePool, id: i64, affected: u64) -> RepoResult<DiningTable> {
    if affected == 0 {
        return Err(RepoError::NotFound(format!("table {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("table {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_create_and_lookup_by_qr() {
        let db = DbService::in_memory().await.unwrap();
        let table = create(&db.pool, 5, 4, TableStatus::Available).await.unwrap();

        assert_eq!(table.qr_code, table_qr_code(5));
        assert!(!table.has_active_orders);

        let found = find_by_qr(&db.pool, &table.qr_code).await.unwrap();
        assert_eq!(found, Some(table));
        assert_eq!(find_by_qr(&db.pool, "table-5-00000000").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_table_number() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, 1, 2, TableStatus::Available).await.unwrap();
        assert!(matches!(
            create(&db.pool, 1, 4, TableStatus::Available).await,
            Err(RepoError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_has_active_orders_is_derived() {
        let db = DbService::in_memory().await.unwrap();
        let table = create(&db.pool, 3, 4, TableStatus::Available).await.unwrap();

        sqlx::query(
            "INSERT INTO orders (order_number, table_number, status, subtotal_cents, tax_cents, total_cents, created_at, updated_at) \
             VALUES ('ORD-000001', 3, 'preparing', 100, 0, 100, 0, 0), \
                    ('ORD-000002', 3, 'completed', 100, 0, 100, 0, 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let reloaded = find_by_id(&db.pool, table.id).await.unwrap().unwrap();
        assert!(reloaded.has_active_orders);
        // stored status is never touched by order activity
        assert_eq!(reloaded.status, TableStatus::Available);

        sqlx::query("UPDATE orders SET status = 'cancelled' WHERE order_number = 'ORD-000001'")
            .execute(&db.pool)
            .await
            .unwrap();
        let reloaded = find_by_id(&db.pool, table.id).await.unwrap().unwrap();
        assert!(!reloaded.has_active_orders);
    }

    #[tokio::test]
    async fn test_status_update_and_delete() {
        let db = DbService::in_memory().await.unwrap();
        let table = create(&db.pool, 9, 2, TableStatus::Available).await.unwrap();

        let updated = update_status(&db.pool, table.id, TableStatus::OutOfOrder)
            .await
            .unwrap();
        assert_eq!(updated.status, TableStatus::OutOfOrder);

        delete(&db.pool, table.id).await.unwrap();
        assert!(matches!(
            delete(&db.pool, table.id).await,
            Err(RepoError::NotFound(_))
        ));
    }
}
