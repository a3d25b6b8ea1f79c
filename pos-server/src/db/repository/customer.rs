//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use shared::pagination::PageQuery;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, phone, email, notes, created_at, updated_at";

/// Search by name or phone substring; returns (page, total)
pub async fn find_page(
    pool: &SqlitePool,
    search: Option<&str>,
    page: &PageQuery,
) -> RepoResult<(Vec<Customer>, i64)> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()));

    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customers WHERE (?1 IS NULL OR lower(name) LIKE ?1 OR phone LIKE ?1) ORDER BY name LIMIT ?2 OFFSET ?3"
    ))
    .bind(&pattern)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM customers WHERE (?1 IS NULL OR lower(name) LIKE ?1 OR phone LIKE ?1)",
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((customers, total))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer =
        sqlx::query_as::<_, Customer>(&format!("SELECT {COLUMNS} FROM customers WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(customer)
}

pub async fn create(pool: &SqlitePool, data: &CustomerCreate, now: i64) -> RepoResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "INSERT INTO customers (name, phone, email, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.name.trim())
    .bind(data.phone.trim())
    .bind(&data.email)
    .bind(&data.notes)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(customer)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &CustomerUpdate,
    now: i64,
) -> RepoResult<Customer> {
    let rows = sqlx::query(
        "UPDATE customers SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), email = COALESCE(?3, email), notes = COALESCE(?4, notes), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.phone.as_deref().map(str::trim))
    .bind(&data.email)
    .bind(&data.notes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    // 预订保留顾客快照 (姓名/电话)，解除关联即可
    sqlx::query("UPDATE reservations SET customer_id = NULL WHERE customer_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    let rows = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
