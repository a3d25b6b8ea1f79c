//! Payment Repository

use super::RepoResult;
use shared::models::{Payment, PaymentFilter, PaymentMethod};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, session_id, order_id, subtotal, tax, discount, total_amount, method, status, transaction_id, notes, refund_reason, processed_by, created_at, paid_at, refunded_at";

pub struct NewPayment<'a> {
    pub session_id: Option<i64>,
    pub order_id: Option<i64>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub method: PaymentMethod,
    pub transaction_id: &'a str,
    pub notes: Option<&'a str>,
    pub processed_by: Option<i64>,
    pub now: i64,
}

/// Insert a PENDING payment. A transaction id collision surfaces as
/// [`RepoError::Duplicate`](super::RepoError::Duplicate).
pub async fn insert(executor: impl SqliteExecutor<'_>, data: NewPayment<'_>) -> RepoResult<Payment> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payments (session_id, order_id, subtotal, tax, discount, total_amount, method, status, transaction_id, notes, processed_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'PENDING', ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.session_id)
    .bind(data.order_id)
    .bind(data.subtotal)
    .bind(data.tax)
    .bind(data.discount)
    .bind(data.total_amount)
    .bind(data.method)
    .bind(data.transaction_id)
    .bind(data.notes)
    .bind(data.processed_by)
    .bind(data.now)
    .fetch_one(executor)
    .await?;
    Ok(payment)
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!("SELECT {COLUMNS} FROM payments WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(payment)
}

pub async fn find_by_transaction_id(
    executor: impl SqliteExecutor<'_>,
    transaction_id: &str,
) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payments WHERE transaction_id = ?"
    ))
    .bind(transaction_id)
    .fetch_optional(executor)
    .await?;
    Ok(payment)
}

pub async fn find_page(
    pool: &SqlitePool,
    filter: &PaymentFilter,
    page: &PageQuery,
) -> RepoResult<(Vec<Payment>, i64)> {
    let where_clause = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR method = ?2) AND (?3 IS NULL OR session_id = ?3) AND (?4 IS NULL OR order_id = ?4)";

    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payments {where_clause} ORDER BY created_at DESC, id DESC LIMIT ?5 OFFSET ?6"
    ))
    .bind(filter.status)
    .bind(filter.method)
    .bind(filter.session_id)
    .bind(filter.order_id)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM payments {where_clause}"))
        .bind(filter.status)
        .bind(filter.method)
        .bind(filter.session_id)
        .bind(filter.order_id)
        .fetch_one(pool)
        .await?;

    Ok((payments, total))
}

/// PENDING -> PAID. False when another caller got there first.
pub async fn mark_paid_if_pending(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    processed_by: Option<i64>,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE payments SET status = 'PAID', paid_at = ?1, processed_by = COALESCE(?2, processed_by), notes = COALESCE(?3, notes) WHERE id = ?4 AND status = 'PENDING'",
    )
    .bind(now)
    .bind(processed_by)
    .bind(notes)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// PENDING -> FAILED
pub async fn mark_failed_if_pending(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    processed_by: Option<i64>,
    notes: Option<&str>,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE payments SET status = 'FAILED', processed_by = COALESCE(?1, processed_by), notes = COALESCE(?2, notes) WHERE id = ?3 AND status = 'PENDING'",
    )
    .bind(processed_by)
    .bind(notes)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// PAID -> REFUNDED
pub async fn refund_if_paid(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    reason: &str,
    notes: Option<&str>,
    processed_by: i64,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE payments SET status = 'REFUNDED', refund_reason = ?1, notes = COALESCE(?2, notes), processed_by = ?3, refunded_at = ?4 WHERE id = ?5 AND status = 'PAID'",
    )
    .bind(reason)
    .bind(notes)
    .bind(processed_by)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
