//! Order Repository (orders + order_items)

use super::{RepoError, RepoResult};
use shared::models::{
    KitchenQueueItem, MenuItem, Order, OrderFilter, OrderItem, OrderItemStatus, OrderStatus,
    OrderType,
};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const ORDER_COLUMNS: &str =
    "o.id, o.session_id, o.order_type, o.status, o.notes, o.created_by, o.created_at, o.updated_at";

const ITEM_COLUMNS: &str = "id, order_id, menu_item_id, name, unit_price, quantity, notes, status, created_at, updated_at";

/// Order joined with the table of its session
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    #[sqlx(flatten)]
    pub order: Order,
    pub table_id: Option<i64>,
    pub table_name: Option<String>,
}

fn order_select() -> String {
    format!(
        "SELECT {ORDER_COLUMNS}, s.table_id AS table_id, t.name AS table_name FROM orders o LEFT JOIN table_sessions s ON s.id = o.session_id LEFT JOIN dining_tables t ON t.id = s.table_id"
    )
}

pub struct NewOrder<'a> {
    pub session_id: Option<i64>,
    pub order_type: OrderType,
    pub notes: Option<&'a str>,
    pub created_by: Option<i64>,
    pub now: i64,
}

pub async fn insert_order(executor: impl SqliteExecutor<'_>, data: NewOrder<'_>) -> RepoResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (session_id, order_type, status, notes, created_by, created_at, updated_at) VALUES (?, ?, 'PENDING', ?, ?, ?, ?) RETURNING id, session_id, order_type, status, notes, created_by, created_at, updated_at",
    )
    .bind(data.session_id)
    .bind(data.order_type)
    .bind(data.notes)
    .bind(data.created_by)
    .bind(data.now)
    .bind(data.now)
    .fetch_one(executor)
    .await?;
    Ok(order)
}

/// Insert a line, snapshotting the menu item's name and price
pub async fn insert_item(
    executor: impl SqliteExecutor<'_>,
    order_id: i64,
    menu_item: &MenuItem,
    quantity: i32,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<OrderItem> {
    let item = sqlx::query_as::<_, OrderItem>(&format!(
        "INSERT INTO order_items (order_id, menu_item_id, name, unit_price, quantity, notes, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 'PENDING', ?, ?) RETURNING {ITEM_COLUMNS}"
    ))
    .bind(order_id)
    .bind(menu_item.id)
    .bind(&menu_item.name)
    .bind(menu_item.price)
    .bind(quantity)
    .bind(notes)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(item)
}

pub async fn find_by_id(executor: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

pub async fn find_row_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderRow>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.id = ?", order_select()))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_page(
    pool: &SqlitePool,
    filter: &OrderFilter,
    page: &PageQuery,
) -> RepoResult<(Vec<OrderRow>, i64)> {
    let where_clause = "WHERE (?1 IS NULL OR o.status = ?1) AND (?2 IS NULL OR o.session_id = ?2) AND (?3 IS NULL OR o.order_type = ?3)";

    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{} {where_clause} ORDER BY o.created_at DESC, o.id DESC LIMIT ?4 OFFSET ?5",
        order_select()
    ))
    .bind(filter.status)
    .bind(filter.session_id)
    .bind(filter.order_type)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders o {where_clause}"))
        .bind(filter.status)
        .bind(filter.session_id)
        .bind(filter.order_type)
        .fetch_one(pool)
        .await?;

    Ok((rows, total))
}

/// Orders of a session, oldest first
pub async fn find_by_session(
    pool: &SqlitePool,
    session_id: i64,
    include_cancelled: bool,
) -> RepoResult<Vec<OrderRow>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{} WHERE o.session_id = ?1 AND (?2 = 1 OR o.status <> 'CANCELLED') ORDER BY o.created_at, o.id",
        order_select()
    ))
    .bind(session_id)
    .bind(include_cancelled)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_items(executor: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(items)
}

/// Items of several orders in one query
pub async fn find_items_for_orders(pool: &SqlitePool, order_ids: &[i64]) -> RepoResult<Vec<OrderItem>> {
    if order_ids.is_empty() {
        return Ok(vec![]);
    }
    let ids_json = serde_json::to_string(order_ids)
        .map_err(|e| RepoError::Database(format!("Failed to encode ids: {e}")))?;

    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id IN (SELECT value FROM json_each(?)) ORDER BY order_id, id"
    ))
    .bind(ids_json)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_item(executor: impl SqliteExecutor<'_>, item_id: i64) -> RepoResult<Option<OrderItem>> {
    let item = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE id = ?"
    ))
    .bind(item_id)
    .fetch_optional(executor)
    .await?;
    Ok(item)
}

/// (total items, items not SERVED)
pub async fn count_items(executor: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<(i64, i64)> {
    let counts: (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status <> 'SERVED' THEN 1 ELSE 0 END), 0) FROM order_items WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_one(executor)
    .await?;
    Ok(counts)
}

/// Conditional status change; false when the row is no longer in `from`
pub async fn update_status_if(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4")
        .bind(to)
        .bind(now)
        .bind(id)
        .bind(from)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn touch(executor: impl SqliteExecutor<'_>, id: i64, now: i64) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Bump `updated_at` of a non-terminal order; false when it is COMPLETED/CANCELLED
pub async fn touch_if_active(executor: impl SqliteExecutor<'_>, id: i64, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET updated_at = ? WHERE id = ? AND status NOT IN ('COMPLETED', 'CANCELLED')",
    )
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn update_item_status_if(
    executor: impl SqliteExecutor<'_>,
    item_id: i64,
    from: OrderItemStatus,
    to: OrderItemStatus,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE order_items SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(item_id)
    .bind(from)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Items not yet SERVED whose order is still active, oldest first
pub async fn kitchen_queue(
    pool: &SqlitePool,
    status: Option<OrderItemStatus>,
) -> RepoResult<Vec<KitchenQueueItem>> {
    let items = sqlx::query_as::<_, KitchenQueueItem>(
        r#"
        SELECT i.id AS item_id, i.order_id, o.order_type, o.status AS order_status,
               t.name AS table_name, i.name, i.quantity, i.notes, i.status, i.created_at
        FROM order_items i
        JOIN orders o ON o.id = i.order_id
        LEFT JOIN table_sessions s ON s.id = o.session_id
        LEFT JOIN dining_tables t ON t.id = s.table_id
        WHERE i.status <> 'SERVED'
          AND o.status NOT IN ('COMPLETED', 'CANCELLED')
          AND (?1 IS NULL OR i.status = ?1)
        ORDER BY i.created_at, i.id
        "#,
    )
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(items)
}
