//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableStatus, DiningTableUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, capacity, location, is_active, created_at, updated_at";

/// Tables with derived occupancy: an OPEN session that has not expired at `now`
pub async fn find_all_with_status(
    pool: &SqlitePool,
    now: i64,
) -> RepoResult<Vec<DiningTableStatus>> {
    let tables = sqlx::query_as::<_, DiningTableStatus>(
        r#"
        SELECT t.id, t.name, t.capacity, t.location, t.is_active, t.created_at, t.updated_at,
               s.id AS current_session_id,
               (s.id IS NOT NULL) AS is_occupied
        FROM dining_tables t
        LEFT JOIN table_sessions s
               ON s.table_id = t.id AND s.status = 'OPEN' AND s.expires_at > ?1
        ORDER BY t.name
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table =
        sqlx::query_as::<_, DiningTable>(&format!("SELECT {COLUMNS} FROM dining_tables WHERE id = ?"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: &DiningTableCreate, now: i64) -> RepoResult<DiningTable> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "INSERT INTO dining_tables (name, capacity, location, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.name.trim())
    .bind(data.capacity.unwrap_or(4))
    .bind(&data.location)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(table)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &DiningTableUpdate,
    now: i64,
) -> RepoResult<DiningTable> {
    let rows = sqlx::query(
        "UPDATE dining_tables SET name = COALESCE(?1, name), capacity = COALESCE(?2, capacity), location = COALESCE(?3, location), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.capacity)
    .bind(&data.location)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// Sessions or reservations still reference the table
pub async fn has_history(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM table_sessions WHERE table_id = ?1) + (SELECT COUNT(*) FROM reservations WHERE table_id = ?1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM dining_tables WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
