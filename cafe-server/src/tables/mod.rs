//! Table Registry
//!
//! 桌台登记：桌号、容量、状态和二维码标识。桌号创建后不可修改，
//! 因此二维码在桌台生命周期内保持稳定。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::CafeEvent;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, dining_table};
use crate::live::Broadcaster;

pub const DEFAULT_CAPACITY: i32 = 4;
pub const MAX_CAPACITY: i32 = 100;

#[derive(Clone, Debug)]
pub struct TableRegistry {
    pool: SqlitePool,
    broadcaster: Broadcaster,
}

impl TableRegistry {
    pub fn new(pool: SqlitePool, broadcaster: Broadcaster) -> Self {
        Self { pool, broadcaster }
    }

    pub async fn list(&self) -> AppResult<Vec<DiningTable>> {
        Ok(dining_table::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<DiningTable> {
        dining_table::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Resolve a scanned QR identifier
    pub async fn find_by_qr(&self, qr_code: &str) -> AppResult<DiningTable> {
        dining_table::find_by_qr(&self.pool, qr_code.trim())
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::TableNotFound, "No table for this QR code")
                    .with_detail("qrCode", qr_code)
            })
    }

    pub async fn create(&self, data: DiningTableCreate) -> AppResult<DiningTable> {
        if data.table_number <= 0 {
            return Err(AppError::invalid_field(
                "tableNumber",
                format!("tableNumber must be positive, got {}", data.table_number),
            ));
        }
        let capacity = data.capacity.unwrap_or(DEFAULT_CAPACITY);
        validate_capacity(capacity)?;

        let table = dining_table::create(
            &self.pool,
            data.table_number,
            capacity,
            data.status.unwrap_or(TableStatus::Available),
        )
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::TableNumberExists,
                format!("Table {} already exists", data.table_number),
            )
            .with_detail("tableNumber", data.table_number),
            other => other.into(),
        })?;

        tracing::info!(table_id = table.id, table_number = table.table_number, "Table created");
        Ok(table)
    }

    pub async fn update(&self, id: i64, data: DiningTableUpdate) -> AppResult<DiningTable> {
        let Some(capacity) = data.capacity else {
            return self.get(id).await;
        };
        validate_capacity(capacity)?;

        let table = dining_table::update_capacity(&self.pool, id, capacity)
            .await
            .map_err(|e| map_repo_error(id, e))?;
        tracing::info!(table_id = id, capacity, "Table updated");
        Ok(table)
    }

    pub async fn set_status(&self, id: i64, status: TableStatus) -> AppResult<DiningTable> {
        let table = dining_table::update_status(&self.pool, id, status)
            .await
            .map_err(|e| map_repo_error(id, e))?;
        tracing::info!(table_id = id, table_number = table.table_number, %status, "Table status updated");

        self.broadcaster
            .broadcast(&CafeEvent::TableStatusUpdated(table.clone()));
        Ok(table)
    }

    /// Orders placed at this table keep their table number
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        dining_table::delete(&self.pool, id)
            .await
            .map_err(|e| map_repo_error(id, e))?;
        tracing::info!(table_id = id, "Table deleted");
        Ok(())
    }
}

fn validate_capacity(capacity: i32) -> AppResult<()> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("capacity must be between 1 and {MAX_CAPACITY}, got {capacity}"),
        )
        .with_detail("field", "capacity"));
    }
    Ok(())
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("tableId", id)
}

fn map_repo_error(id: i64, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => not_found(id),
        other => other.into(),
    }
}
