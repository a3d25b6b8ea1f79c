//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Table with derived occupancy (an OPEN, unexpired session exists)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTableStatus {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub table: DiningTable,
    pub is_occupied: bool,
    pub current_session_id: Option<i64>,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiningTableUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// QR ordering link for a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableQrCode {
    pub table_id: i64,
    pub token: String,
    /// `{PUBLIC_BASE_URL}/order?token=...`
    pub url: String,
    pub expires_at: i64,
}
