//! Order Model

use crate::lifecycle::StatusMachine;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 订单状态 (forward only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl StatusMachine for OrderStatus {
    const ENTITY: &'static str = "order";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Served => "SERVED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    fn allowed_next(&self) -> &'static [Self] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Preparing, Ready, Served, Completed, Cancelled],
            Confirmed => &[Preparing, Ready, Served, Completed, Cancelled],
            Preparing => &[Ready, Served, Completed, Cancelled],
            Ready => &[Served, Completed],
            Served => &[Completed],
            Completed | Cancelled => &[],
        }
    }
}

impl OrderStatus {
    /// Moving into this state needs at least one item
    pub fn requires_items(&self) -> bool {
        !matches!(self, Self::Pending | Self::Cancelled)
    }
}

/// 订单明细状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

impl StatusMachine for OrderItemStatus {
    const ENTITY: &'static str = "order item";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Served => "SERVED",
        }
    }

    fn allowed_next(&self) -> &'static [Self] {
        use OrderItemStatus::*;
        match self {
            Pending => &[Preparing, Ready, Served],
            Preparing => &[Ready, Served],
            Ready => &[Served],
            Served => &[],
        }
    }
}

/// 堂食 / 外带
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub session_id: Option<i64>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Staff user who placed the order (None for guest QR orders)
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line. `name` and `unit_price` are snapshots taken at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: OrderItemStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order with its items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub table_id: Option<i64>,
    pub table_name: Option<String>,
    pub items: Vec<OrderItem>,
}

/// One requested line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    #[validate(range(min = 1, max = 999))]
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub session_id: Option<i64>,
    #[serde(default)]
    pub order_type: OrderType,
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItemInput>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Guest order payload (session comes from the gate)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GuestOrderCreate {
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItemInput>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Append items to an existing order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemsAdd {
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItemInput>,
}

/// Order status change
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Item status change
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemStatusUpdate {
    pub status: OrderItemStatus,
}

/// Order list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub session_id: Option<i64>,
    pub order_type: Option<OrderType>,
}

/// Bill line (computed at read time)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillLine {
    pub item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Order bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBill {
    pub order_id: i64,
    pub items: Vec<BillLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

/// Session bill: all non-cancelled orders of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBill {
    pub session_id: i64,
    pub orders: Vec<OrderBill>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_forward_edges() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Served));
        assert!(OrderStatus::Served.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_order_no_backwards_or_self_loops() {
        let all = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ];
        for s in all {
            assert!(!s.can_transition_to(s), "{s:?} self-loop");
        }
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Served.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_requires_items() {
        assert!(OrderStatus::Confirmed.requires_items());
        assert!(OrderStatus::Completed.requires_items());
        assert!(!OrderStatus::Cancelled.requires_items());
    }

    #[test]
    fn test_item_forward_only() {
        use OrderItemStatus::*;
        let order = [Pending, Preparing, Ready, Served];
        for (i, from) in order.iter().enumerate() {
            for (j, to) in order.iter().enumerate() {
                assert_eq!(from.can_transition_to(*to), j > i, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderType::DineIn).unwrap(),
            "\"DINE_IN\""
        );
        let status: OrderItemStatus = serde_json::from_str("\"PREPARING\"").unwrap();
        assert_eq!(status, OrderItemStatus::Preparing);
    }
}
