use std::sync::Arc;

use serde_json::Value;
use shared::message::ServerEvent;
use shared::models::{Notification, NotificationType};
use shared::pagination::{PageQuery, PaginatedResponse};
use sqlx::SqlitePool;

use super::NotificationHub;
use crate::db::repository::{RepoError, notification, user};
use crate::utils::{AppError, AppResult, ErrorCode};

/// 通知服务: 先落库再推送
///
/// 数据库行是唯一事实来源，websocket 推送只是加速，离线用户上线后
/// 通过列表接口补齐。
#[derive(Clone, Debug)]
pub struct NotificationService {
    pool: SqlitePool,
    hub: Arc<NotificationHub>,
}

impl NotificationService {
    pub fn new(pool: SqlitePool, hub: Arc<NotificationHub>) -> Self {
        Self { pool, hub }
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    /// 通知单个用户
    pub async fn notify_user(
        &self,
        user_id: i64,
        kind: NotificationType,
        title: &str,
        message: &str,
        metadata: Value,
    ) -> AppResult<Notification> {
        let now = shared::util::now_millis();
        let created =
            notification::insert(&self.pool, user_id, kind, title, message, &metadata, now).await?;
        self.deliver(&created).await;
        Ok(created)
    }

    /// 通知所有在职员工，每人一行
    pub async fn broadcast(
        &self,
        kind: NotificationType,
        title: &str,
        message: &str,
        metadata: Value,
    ) -> AppResult<Vec<Notification>> {
        let user_ids = user::find_active_ids(&self.pool).await?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let mut created = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            created.push(
                notification::insert(&mut *tx, user_id, kind, title, message, &metadata, now)
                    .await?,
            );
        }
        tx.commit().await.map_err(RepoError::from)?;

        for n in &created {
            self.deliver(n).await;
        }
        tracing::debug!(kind = ?kind, recipients = created.len(), "Notification broadcast");
        Ok(created)
    }

    /// 业务流程里的广播: 失败只记日志，不影响主流程
    pub async fn emit(&self, kind: NotificationType, title: &str, message: &str, metadata: Value) {
        if let Err(e) = self.broadcast(kind, title, message, metadata).await {
            tracing::warn!(kind = ?kind, error = %e, "Failed to emit notification");
        }
    }

    /// 推送通知本身和重新计算的未读数
    async fn deliver(&self, n: &Notification) {
        if !self.hub.is_online(n.user_id) {
            return;
        }
        self.hub.push(n.user_id, &ServerEvent::Notification(n.clone()));
        self.push_unread_count(n.user_id).await;
    }

    async fn push_unread_count(&self, user_id: i64) {
        match notification::unread_count(&self.pool, user_id).await {
            Ok(count) => {
                self.hub.push(user_id, &ServerEvent::UnreadCount { count });
            }
            Err(e) => tracing::warn!(user_id, error = %e, "Failed to count unread notifications"),
        }
    }

    pub async fn list(
        &self,
        user_id: i64,
        is_read: Option<bool>,
        page: &PageQuery,
    ) -> AppResult<PaginatedResponse<Notification>> {
        let (rows, total) = notification::find_page(&self.pool, user_id, is_read, page).await?;
        Ok(PaginatedResponse::from_query(rows, total, page))
    }

    /// 实时 COUNT，不维护计数器
    pub async fn unread_count(&self, user_id: i64) -> AppResult<i64> {
        Ok(notification::unread_count(&self.pool, user_id).await?)
    }

    /// 标记已读 (幂等)，只能操作自己的通知。返回最新未读数。
    pub async fn mark_as_read(&self, user_id: i64, id: i64) -> AppResult<i64> {
        if !notification::exists_for_user(&self.pool, id, user_id).await? {
            return Err(AppError::new(ErrorCode::NotificationNotFound));
        }
        let changed =
            notification::mark_read(&self.pool, id, user_id, shared::util::now_millis()).await?;
        let count = self.unread_count(user_id).await?;
        if changed > 0 {
            self.hub.push(user_id, &ServerEvent::UnreadCount { count });
        }
        Ok(count)
    }

    /// 全部已读 (幂等)，返回本次标记的条数
    pub async fn mark_all_as_read(&self, user_id: i64) -> AppResult<u64> {
        let changed =
            notification::mark_all_read(&self.pool, user_id, shared::util::now_millis()).await?;
        if changed > 0 {
            self.hub.push(user_id, &ServerEvent::UnreadCount { count: 0 });
        }
        Ok(changed)
    }
}
