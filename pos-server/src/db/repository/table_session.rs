//! Table Session Repository

use super::{RepoError, RepoResult};
use shared::models::{SessionFilter, TableSession, TableSessionDetail};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str =
    "id, table_id, secret_hash, customer_count, notes, status, created_at, expires_at, closed_at";

const DETAIL_SELECT: &str = "SELECT s.id, s.table_id, s.secret_hash, s.customer_count, s.notes, s.status, s.created_at, s.expires_at, s.closed_at, t.name AS table_name FROM table_sessions s JOIN dining_tables t ON t.id = s.table_id";

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_sessions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(session)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<TableSessionDetail>> {
    let detail = sqlx::query_as::<_, TableSessionDetail>(&format!("{DETAIL_SELECT} WHERE s.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(detail)
}

pub async fn find_page(
    pool: &SqlitePool,
    filter: &SessionFilter,
    page: &PageQuery,
) -> RepoResult<(Vec<TableSessionDetail>, i64)> {
    let where_clause = "WHERE (?1 IS NULL OR s.status = ?1) AND (?2 IS NULL OR s.table_id = ?2)";

    let sessions = sqlx::query_as::<_, TableSessionDetail>(&format!(
        "{DETAIL_SELECT} {where_clause} ORDER BY s.created_at DESC, s.id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(filter.status)
    .bind(filter.table_id)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM table_sessions s {where_clause}"
    ))
    .bind(filter.status)
    .bind(filter.table_id)
    .fetch_one(pool)
    .await?;

    Ok((sessions, total))
}

/// The OPEN session of a table (expired or not)
pub async fn find_open_by_table(
    executor: impl SqliteExecutor<'_>,
    table_id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_sessions WHERE table_id = ? AND status = 'OPEN' LIMIT 1"
    ))
    .bind(table_id)
    .fetch_optional(executor)
    .await?;
    Ok(session)
}

/// Close OPEN sessions of the table whose `expires_at <= now`
pub async fn close_expired_for_table(
    executor: impl SqliteExecutor<'_>,
    table_id: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE table_sessions SET status = 'CLOSED', closed_at = ?1 WHERE table_id = ?2 AND status = 'OPEN' AND expires_at <= ?1",
    )
    .bind(now)
    .bind(table_id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected())
}

pub struct NewSession<'a> {
    pub table_id: i64,
    pub secret_hash: &'a str,
    pub customer_count: Option<i32>,
    pub notes: Option<&'a str>,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Insert an OPEN session.
///
/// A second OPEN session for the same table violates `uq_table_sessions_one_open`
/// and surfaces as [`RepoError::Duplicate`].
pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    data: NewSession<'_>,
) -> RepoResult<TableSession> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "INSERT INTO table_sessions (table_id, secret_hash, customer_count, notes, status, created_at, expires_at) VALUES (?, ?, ?, ?, 'OPEN', ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.table_id)
    .bind(data.secret_hash)
    .bind(data.customer_count)
    .bind(data.notes)
    .bind(data.created_at)
    .bind(data.expires_at)
    .fetch_one(executor)
    .await?;
    Ok(session)
}

pub async fn update_details(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    customer_count: Option<i32>,
    notes: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE table_sessions SET customer_count = COALESCE(?1, customer_count), notes = COALESCE(?2, notes) WHERE id = ?3",
    )
    .bind(customer_count)
    .bind(notes)
    .bind(id)
    .execute(executor)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Session {id} not found")));
    }
    Ok(())
}

/// OPEN -> CLOSED. Returns false when the session was not OPEN.
pub async fn close_if_open(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE table_sessions SET status = 'CLOSED', closed_at = ?1, notes = COALESCE(?2, notes) WHERE id = ?3 AND status = 'OPEN'",
    )
    .bind(now)
    .bind(notes)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
