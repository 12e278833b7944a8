//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use shared::util::now_millis;
use sqlx::SqlitePool;

const SELECT_COLUMNS: &str =
    "SELECT id, username, password_hash, role, is_active, created_at FROM users";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT_COLUMNS} WHERE username = ?");
    Ok(sqlx::query_as(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?)
}

/// `password_hash` must already be an Argon2 PHC string
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: Role,
) -> RepoResult<User> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, role, is_active, created_at) VALUES (?, ?, ?, 1, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .bind(now_millis())
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("user {id} vanished after insert")))
}

pub async fn count_by_role(pool: &SqlitePool, role: Role) -> RepoResult<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?)
}
