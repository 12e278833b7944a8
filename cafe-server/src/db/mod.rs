//! SQLite storage
//!
//! Money is stored as integer cents (see [`cents`]); every table is
//! created by the embedded migrations.

pub mod cents;
pub mod repository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::utils::AppError;

/// Writers wait this long for the lock instead of failing at once
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_POOL_SIZE: u32 = 5;

/// Connection pool handle, cheap to clone
#[derive(Clone, Debug)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open or create the database file, then migrate
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let options = parse_url(&format!("sqlite:{db_path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true)
            .optimize_on_close(true, None);

        let pool = connect(SqlitePoolOptions::new().max_connections(FILE_POOL_SIZE), options).await?;
        tracing::info!(path = db_path, "SQLite opened (WAL)");

        Self::migrate(pool).await
    }

    /// Private in-memory database for tests.
    ///
    /// Exactly one connection that is never recycled: each new in-memory
    /// connection would start from an empty database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = parse_url("sqlite::memory:")?.foreign_keys(true);
        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);

        Self::migrate(connect(pool_options, options).await?).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        tracing::debug!("Schema up to date");

        Ok(Self { pool })
    }
}

fn parse_url(url: &str) -> Result<SqliteConnectOptions, AppError> {
    SqliteConnectOptions::from_str(url)
        .map_err(|e| AppError::database(format!("Bad database location {url:?}: {e}")))
}

async fn connect(
    pool_options: SqlitePoolOptions,
    options: SqliteConnectOptions,
) -> Result<SqlitePool, AppError> {
    pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::store_unavailable(format!("Cannot open database: {e}")))
}
