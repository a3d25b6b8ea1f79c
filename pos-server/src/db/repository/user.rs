//! User Repository (staff accounts)

use super::{RepoError, RepoResult};
use shared::models::{User, UserRecord};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT u.id, u.username, u.display_name, u.role_id, r.name AS role_name, u.is_system, u.is_active, u.created_at, u.updated_at FROM users u JOIN roles r ON r.id = u.role_id";

const RECORD_COLUMNS: &str =
    "id, username, password_hash, display_name, role_id, is_system, is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.username"))
        .fetch_all(pool)
        .await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_record_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserRecord>> {
    let record = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn find_record_by_username(
    pool: &SqlitePool,
    username: &str,
) -> RepoResult<Option<UserRecord>> {
    let record = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM users WHERE username = ? LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub role_id: i64,
    pub is_system: bool,
}

pub async fn create(pool: &SqlitePool, data: NewUser<'_>, now: i64) -> RepoResult<User> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash, display_name, role_id, is_system, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.username)
    .bind(data.password_hash)
    .bind(data.display_name)
    .bind(data.role_id)
    .bind(data.is_system)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

#[derive(Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    pub is_active: Option<bool>,
}

pub async fn update(pool: &SqlitePool, id: i64, changes: UserChanges, now: i64) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET username = COALESCE(?1, username), password_hash = COALESCE(?2, password_hash), display_name = COALESCE(?3, display_name), role_id = COALESCE(?4, role_id), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(changes.username)
    .bind(changes.password_hash)
    .bind(changes.display_name)
    .bind(changes.role_id)
    .bind(changes.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Active staff ids (broadcast notification targets)
pub async fn find_active_ids(pool: &SqlitePool) -> RepoResult<Vec<i64>> {
    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE is_active = 1 ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(ids)
}
