//! Notification Repository

use super::RepoResult;
use serde_json::Value;
use shared::models::{Notification, NotificationType};
use shared::pagination::PageQuery;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, user_id, type, title, message, is_read, metadata, created_at, read_at";

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    user_id: i64,
    kind: NotificationType,
    title: &str,
    message: &str,
    metadata: &Value,
    now: i64,
) -> RepoResult<Notification> {
    let notification = sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (user_id, type, title, message, is_read, metadata, created_at) VALUES (?, ?, ?, ?, 0, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(kind)
    .bind(title)
    .bind(message)
    .bind(metadata.to_string())
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(notification)
}

pub async fn find_page(
    pool: &SqlitePool,
    user_id: i64,
    is_read: Option<bool>,
    page: &PageQuery,
) -> RepoResult<(Vec<Notification>, i64)> {
    let notifications = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {COLUMNS} FROM notifications WHERE user_id = ?1 AND (?2 IS NULL OR is_read = ?2) ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(user_id)
    .bind(is_read)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND (?2 IS NULL OR is_read = ?2)",
    )
    .bind(user_id)
    .bind(is_read)
    .fetch_one(pool)
    .await?;

    Ok((notifications, total))
}

pub async fn unread_count(executor: impl SqliteExecutor<'_>, user_id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .fetch_one(executor)
            .await?;
    Ok(count)
}

/// Whether the notification exists and belongs to `user_id`
pub async fn exists_for_user(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Idempotent: already-read rows keep their original `read_at`
pub async fn mark_read(pool: &SqlitePool, id: i64, user_id: i64, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE notifications SET is_read = 1, read_at = ? WHERE id = ? AND user_id = ? AND is_read = 0",
    )
    .bind(now)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE notifications SET is_read = 1, read_at = ? WHERE user_id = ? AND is_read = 0",
    )
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}
