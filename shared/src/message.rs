//! 通知 websocket 消息类型
//!
//! JSON 帧格式: `{"event": "<name>", "data": ...}`

use crate::models::Notification;
use serde::{Deserialize, Serialize};

/// Server → client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A newly persisted notification for this user
    Notification(Notification),
    /// Recomputed unread count
    UnreadCount { count: i64 },
}

/// Client → server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    MarkAsRead { id: i64 },
    MarkAllAsRead,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_count_frame() {
        let json = serde_json::to_string(&ServerEvent::UnreadCount { count: 3 }).unwrap();
        assert_eq!(json, r#"{"event":"unreadCount","data":{"count":3}}"#);
    }

    #[test]
    fn test_client_frames() {
        let ev: ClientEvent = serde_json::from_str(r#"{"event":"markAsRead","data":{"id":7}}"#).unwrap();
        assert!(matches!(ev, ClientEvent::MarkAsRead { id: 7 }));

        let ev: ClientEvent = serde_json::from_str(r#"{"event":"markAllAsRead"}"#).unwrap();
        assert!(matches!(ev, ClientEvent::MarkAllAsRead));
    }
}
