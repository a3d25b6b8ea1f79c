//! Kitchen display rows

use super::order::{OrderItemStatus, OrderStatus, OrderType};
use serde::{Deserialize, Serialize};

/// One pending line on the kitchen display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenQueueItem {
    pub item_id: i64,
    pub order_id: i64,
    pub order_type: OrderType,
    pub order_status: OrderStatus,
    pub table_name: Option<String>,
    pub name: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub status: OrderItemStatus,
    pub created_at: i64,
}

/// Kitchen queue filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KitchenFilter {
    pub status: Option<OrderItemStatus>,
}
