//! Bank Transfer Repository (webhook ledger)

use super::RepoResult;
use shared::models::{BankTransfer, BankTransferPayload, BankTransferStatus};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, gateway, transaction_date, account_number, payment_code, content, transfer_type, amount, accumulated, sub_account, reference_code, status, payment_id, received_at";

/// Record a received transfer. Returns false when the provider id was seen before.
pub async fn insert_received(
    executor: impl SqliteExecutor<'_>,
    payload: &BankTransferPayload,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT INTO bank_transfers (id, gateway, transaction_date, account_number, payment_code, content, transfer_type, amount, accumulated, sub_account, reference_code, status, received_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'RECEIVED', ?) ON CONFLICT(id) DO NOTHING",
    )
    .bind(payload.id)
    .bind(&payload.gateway)
    .bind(&payload.transaction_date)
    .bind(&payload.account_number)
    .bind(&payload.code)
    .bind(&payload.content)
    .bind(&payload.transfer_type)
    .bind(payload.transfer_amount)
    .bind(payload.accumulated)
    .bind(&payload.sub_account)
    .bind(&payload.reference_code)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_outcome(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    status: BankTransferStatus,
    payment_id: Option<i64>,
) -> RepoResult<()> {
    sqlx::query("UPDATE bank_transfers SET status = ?, payment_id = ? WHERE id = ?")
        .bind(status)
        .bind(payment_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<BankTransfer>> {
    let transfer = sqlx::query_as::<_, BankTransfer>(&format!(
        "SELECT {COLUMNS} FROM bank_transfers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(transfer)
}

/// Ledger listing for manual reconciliation
pub async fn find_page(
    pool: &SqlitePool,
    status: Option<BankTransferStatus>,
    page: &PageQuery,
) -> RepoResult<(Vec<BankTransfer>, i64)> {
    let transfers = sqlx::query_as::<_, BankTransfer>(&format!(
        "SELECT {COLUMNS} FROM bank_transfers WHERE (?1 IS NULL OR status = ?1) ORDER BY received_at DESC, id DESC LIMIT ?2 OFFSET ?3"
    ))
    .bind(status)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bank_transfers WHERE (?1 IS NULL OR status = ?1)")
            .bind(status)
            .fetch_one(pool)
            .await?;

    Ok((transfers, total))
}
