//! 在线连接表
//!
//! `user_id → [连接发送端]`。一个员工可以同时开多个终端，每个 websocket
//! 连接注册一个有界 `mpsc` 发送端；推送时顺手清理已关闭的连接。

use dashmap::DashMap;
use shared::message::ServerEvent;
use tokio::sync::mpsc;

/// 每个连接的缓冲上限，慢连接满了就丢弃本条推送
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
pub struct NotificationHub {
    connections: DashMap<i64, Vec<mpsc::Sender<ServerEvent>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个连接，返回该连接的接收端
    pub fn register(&self, user_id: i64) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.connections.entry(user_id).or_default().push(tx);
        tracing::debug!(user_id, "Notification channel registered");
        rx
    }

    /// 推送给某个用户的所有在线连接，返回成功投递的连接数
    pub fn push(&self, user_id: i64, event: &ServerEvent) -> usize {
        let mut delivered = 0;
        let mut empty = false;

        if let Some(mut senders) = self.connections.get_mut(&user_id) {
            senders.retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(user_id, "Notification channel full, event dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            });
            empty = senders.is_empty();
        }

        // RefMut 已释放才能 remove
        if empty {
            self.connections.remove_if(&user_id, |_, senders| senders.is_empty());
        }
        delivered
    }

    /// 连接断开后清理
    pub fn prune(&self, user_id: i64) {
        if let Some(mut senders) = self.connections.get_mut(&user_id) {
            senders.retain(|tx| !tx.is_closed());
        }
        self.connections.remove_if(&user_id, |_, senders| senders.is_empty());
    }

    /// 用户是否有在线连接
    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|senders| senders.iter().any(|tx| !tx.is_closed()))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|entry| entry.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_reaches_every_connection() {
        let hub = NotificationHub::new();
        let mut a = hub.register(1);
        let mut b = hub.register(1);
        let mut other = hub.register(2);

        let delivered = hub.push(1, &ServerEvent::UnreadCount { count: 4 });
        assert_eq!(delivered, 2);

        assert!(matches!(a.recv().await, Some(ServerEvent::UnreadCount { count: 4 })));
        assert!(matches!(b.recv().await, Some(ServerEvent::UnreadCount { count: 4 })));
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_connections_are_pruned() {
        let hub = NotificationHub::new();
        let rx = hub.register(7);
        let mut alive = hub.register(7);
        drop(rx);

        assert_eq!(hub.push(7, &ServerEvent::UnreadCount { count: 1 }), 1);
        assert_eq!(hub.connection_count(), 1);
        assert!(alive.recv().await.is_some());

        drop(alive);
        hub.prune(7);
        assert!(!hub.is_online(7));
        assert_eq!(hub.connection_count(), 0);
    }

    #[test]
    fn test_push_to_offline_user() {
        let hub = NotificationHub::new();
        assert_eq!(hub.push(99, &ServerEvent::UnreadCount { count: 0 }), 0);
    }
}
