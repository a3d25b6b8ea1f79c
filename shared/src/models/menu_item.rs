//! Menu Item Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu item (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i64,
    /// Externally hosted image (upload is handled elsewhere)
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub price: f64,
    pub category_id: i64,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000_000.0))]
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Menu item list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemFilter {
    pub category_id: Option<i64>,
    pub is_available: Option<bool>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}
