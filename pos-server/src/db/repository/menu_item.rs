//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemFilter, MenuItemUpdate};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str =
    "id, name, description, price, category_id, image_url, is_available, created_at, updated_at";

const FILTER: &str = "(?1 IS NULL OR category_id = ?1) AND (?2 IS NULL OR is_available = ?2) AND (?3 IS NULL OR lower(name) LIKE ?3)";

pub async fn find_page(
    pool: &SqlitePool,
    filter: &MenuItemFilter,
    page: &PageQuery,
) -> RepoResult<(Vec<MenuItem>, i64)> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()));

    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_items WHERE {FILTER} ORDER BY category_id, name LIMIT ?4 OFFSET ?5"
    ))
    .bind(filter.category_id)
    .bind(filter.is_available)
    .bind(&search)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM menu_items WHERE {FILTER}"))
        .bind(filter.category_id)
        .bind(filter.is_available)
        .bind(&search)
        .fetch_one(pool)
        .await?;

    Ok((items, total))
}

/// Available items in active categories (guest menu)
pub async fn find_available(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(
        "SELECT m.id, m.name, m.description, m.price, m.category_id, m.image_url, m.is_available, m.created_at, m.updated_at FROM menu_items m JOIN categories c ON c.id = m.category_id WHERE m.is_available = 1 AND c.is_active = 1 ORDER BY c.sort_order, m.name",
    )
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!("SELECT {COLUMNS} FROM menu_items WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(item)
}

pub async fn create(pool: &SqlitePool, data: &MenuItemCreate, now: i64) -> RepoResult<MenuItem> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "INSERT INTO menu_items (name, description, price, category_id, image_url, is_available, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(&data.image_url)
    .bind(data.is_available.unwrap_or(true))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &MenuItemUpdate,
    now: i64,
) -> RepoResult<MenuItem> {
    let rows = sqlx::query(
        "UPDATE menu_items SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), category_id = COALESCE(?4, category_id), image_url = COALESCE(?5, image_url), is_available = COALESCE(?6, is_available), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.price)
    .bind(data.category_id)
    .bind(&data.image_url)
    .bind(data.is_available)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Referenced by order lines
pub async fn count_order_items(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE menu_item_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
