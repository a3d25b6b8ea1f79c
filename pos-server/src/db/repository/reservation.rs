//! Reservation Repository

use super::{RepoError, RepoResult};
use shared::models::{Reservation, ReservationCreate, ReservationFilter, ReservationStatus};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, table_id, customer_id, customer_name, customer_phone, party_size, reserved_at, duration_minutes, notes, status, created_at, updated_at";

pub async fn find_page(
    pool: &SqlitePool,
    filter: &ReservationFilter,
    page: &PageQuery,
) -> RepoResult<(Vec<Reservation>, i64)> {
    let where_clause = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR table_id = ?2) AND (?3 IS NULL OR reserved_at >= ?3) AND (?4 IS NULL OR reserved_at < ?4)";

    let reservations = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations {where_clause} ORDER BY reserved_at, id LIMIT ?5 OFFSET ?6"
    ))
    .bind(filter.status)
    .bind(filter.table_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reservations {where_clause}"))
        .bind(filter.status)
        .bind(filter.table_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

    Ok((reservations, total))
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Reservation>> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(reservation)
}

/// PENDING/CONFIRMED reservations on `table_id` overlapping `[start, end)`
pub async fn count_overlaps(
    executor: impl SqliteExecutor<'_>,
    table_id: i64,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reservations
        WHERE table_id = ?1
          AND status IN ('PENDING', 'CONFIRMED')
          AND reserved_at < ?3
          AND reserved_at + duration_minutes * 60000 > ?2
          AND (?4 IS NULL OR id <> ?4)
        "#,
    )
    .bind(table_id)
    .bind(start)
    .bind(end)
    .bind(exclude_id)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    data: &ReservationCreate,
    now: i64,
) -> RepoResult<Reservation> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "INSERT INTO reservations (table_id, customer_id, customer_name, customer_phone, party_size, reserved_at, duration_minutes, notes, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'PENDING', ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.table_id)
    .bind(data.customer_id)
    .bind(data.customer_name.trim())
    .bind(data.customer_phone.trim())
    .bind(data.party_size)
    .bind(data.reserved_at)
    .bind(data.duration_minutes)
    .bind(&data.notes)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(reservation)
}

/// Overwrite editable fields with an already merged reservation
pub async fn update(executor: impl SqliteExecutor<'_>, r: &Reservation, now: i64) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE reservations SET table_id = ?, customer_name = ?, customer_phone = ?, party_size = ?, reserved_at = ?, duration_minutes = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(r.table_id)
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(r.party_size)
    .bind(r.reserved_at)
    .bind(r.duration_minutes)
    .bind(&r.notes)
    .bind(now)
    .bind(r.id)
    .execute(executor)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {} not found", r.id)));
    }
    Ok(())
}

pub async fn update_status_if(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE reservations SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM reservations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
