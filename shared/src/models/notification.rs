//! Notification Model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NotificationType {
    NewOrder,
    OrderReady,
    PaymentSuccess,
    PaymentFailed,
    ReservationChanged,
    CustomerRequest,
}

/// Persisted notification (one row per target user)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "db", sqlx(rename = "type"))]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub metadata: Value,
    pub created_at: i64,
    pub read_at: Option<i64>,
}

/// Notification list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    pub is_read: Option<bool>,
}

/// 顾客呼叫类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerRequestKind {
    CallWaiter,
    RequestBill,
    Other,
}

impl CustomerRequestKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CallWaiter => "Call waiter",
            Self::RequestBill => "Request bill",
            Self::Other => "Customer request",
        }
    }
}

/// Guest request from the table
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerRequestCreate {
    pub kind: CustomerRequestKind,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_field_name() {
        let n = Notification {
            id: 1,
            user_id: 2,
            kind: NotificationType::OrderReady,
            title: "t".into(),
            message: "m".into(),
            is_read: false,
            metadata: serde_json::json!({"order_id": 3}),
            created_at: 0,
            read_at: None,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "ORDER_READY");
        assert_eq!(json["metadata"]["order_id"], 3);
    }
}
